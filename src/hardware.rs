//! Hardware probe contract.
//!
//! The probe is an external script that writes a JSON object to a
//! well-known temporary file instead of printing it. Its content is
//! passed through to the exported configuration; only the
//! `optimization` section is read here.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    cmd::{self, Bounded},
    config::{OptimizationMode, ProbeSettings},
    error::WizardError,
};

const RESULT_STEM: &str = "vmware_hw_capabilities";
const DEFAULT_SCORE: f64 = 50.0;

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Opaque capabilities object produced by the probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HwCapabilities(Map<String, Value>);

/// The probe's advice, with defaults for anything it left out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    pub mode: OptimizationMode,
    pub score: f64,
}

impl Default for Recommendation {
    fn default() -> Self {
        Recommendation {
            mode: OptimizationMode::Optimized,
            score: DEFAULT_SCORE,
        }
    }
}

impl HwCapabilities {
    /// Accepts only JSON objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(HwCapabilities(map)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads `optimization.recommended_mode` and
    /// `optimization.optimization_score`. Each key falls back to its own
    /// default when missing or of the wrong type.
    pub fn recommendation(&self) -> Recommendation {
        let section = self.0.get("optimization").and_then(Value::as_object);
        let field = |key: &str| section.and_then(|s| s.get(key));

        Recommendation {
            mode: field("recommended_mode")
                .and_then(Value::as_str)
                .map(OptimizationMode::from_recommendation)
                .unwrap_or(OptimizationMode::Optimized),
            score: field("optimization_score")
                .and_then(Value::as_f64)
                .unwrap_or(DEFAULT_SCORE),
        }
    }

    /// Rows for the hardware summary box: each top-level section with a
    /// short rendering of its scalar fields.
    pub fn summary_rows(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(key, _)| key.as_str() != "optimization")
            .map(|(key, value)| (key.clone(), render_brief(value)))
            .collect()
    }
}

fn render_brief(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let scalars: Vec<String> = map
                .iter()
                .filter_map(|(k, v)| match v {
                    Value::String(s) => Some(format!("{}={}", k, s)),
                    Value::Bool(_) | Value::Number(_) => Some(format!("{}={}", k, v)),
                    _ => None,
                })
                .take(3)
                .collect();
            if scalars.is_empty() {
                format!("{} entries", map.len())
            } else {
                scalars.join("  ")
            }
        }
        Value::Array(items) => format!("{} entries", items.len()),
        other => other.to_string(),
    }
}

// ── Probe ─────────────────────────────────────────────────────────────────────

/// Result of running the probe. `Unavailable` is a normal outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Detected(HwCapabilities),
    Unavailable(String),
}

impl ProbeOutcome {
    pub fn into_capabilities(self) -> HwCapabilities {
        match self {
            ProbeOutcome::Detected(caps) => caps,
            ProbeOutcome::Unavailable(_) => HwCapabilities::default(),
        }
    }
}

/// Files the probe may have written, in lookup order.
pub fn result_files(tmp_dir: &Path, probe_pid: u32) -> [PathBuf; 2] {
    [
        tmp_dir.join(format!("{}.json", RESULT_STEM)),
        tmp_dir.join(format!("{}_{}.json", RESULT_STEM, probe_pid)),
    ]
}

fn read_result(path: &Path) -> Result<HwCapabilities, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let value: Value =
        serde_json::from_str(&text).map_err(|e| format!("{}: malformed JSON: {}", path.display(), e))?;
    HwCapabilities::from_value(value)
        .ok_or_else(|| format!("{}: expected a JSON object", path.display()))
}

/// Runs the probe within its time budget and loads what it wrote.
/// Every failure degrades to `Unavailable`; only Ctrl-C is an error.
pub fn probe(settings: &ProbeSettings) -> Result<ProbeOutcome, WizardError> {
    if !settings.script.exists() {
        return Ok(ProbeOutcome::Unavailable(format!(
            "Hardware detection script not found at {}",
            settings.script.display()
        )));
    }

    let script = settings.script.to_string_lossy();
    let pid = match cmd::run_bounded(&settings.interpreter, &[&*script], settings.timeout) {
        Err(WizardError::Cancelled) => return Err(WizardError::Cancelled),
        Err(e) => {
            return Ok(ProbeOutcome::Unavailable(format!(
                "Hardware detection failed: {}",
                e
            )))
        }
        Ok(Bounded::TimedOut) => {
            return Ok(ProbeOutcome::Unavailable(format!(
                "Hardware detection timed out after {}s",
                settings.timeout.as_secs()
            )))
        }
        Ok(Bounded::Exited { status, .. }) if !status.success() => {
            return Ok(ProbeOutcome::Unavailable(format!(
                "Hardware detection exited with code {}",
                status.code().unwrap_or(-1)
            )))
        }
        Ok(Bounded::Exited { pid, .. }) => pid,
    };

    let Some(path) = result_files(&settings.tmp_dir, pid)
        .into_iter()
        .find(|p| p.exists())
    else {
        return Ok(ProbeOutcome::Unavailable(
            "Hardware detection produced no result file".to_string(),
        ));
    };

    debug!(path = %path.display(), "reading probe result");
    Ok(match read_result(&path) {
        Ok(caps) => {
            info!(sections = caps.0.len(), "hardware capabilities loaded");
            ProbeOutcome::Detected(caps)
        }
        Err(reason) => ProbeOutcome::Unavailable(format!("Hardware detection failed: {}", reason)),
    })
}
