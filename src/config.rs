use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::Serialize;
use tracing::info;

use crate::{
    error::WizardError,
    hardware::HwCapabilities,
    kernel::{KernelRecord, SupportMatrix},
};

// ── Runtime settings ──────────────────────────────────────────────────────────

/// Everything the wizard needs to know about its surroundings,
/// assembled once from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub dry_run: bool,
    pub modules_dir: PathBuf,
    pub output: PathBuf,
    pub support: SupportMatrix,
    pub probe: ProbeSettings,
    pub memory: MemorySettings,
}

/// How to launch the hardware probe and where it leaves its result.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub interpreter: String,
    pub script: PathBuf,
    pub tmp_dir: PathBuf,
    pub timeout: Duration,
}

/// How to launch the memory / huge-page fixer.
#[derive(Debug, Clone)]
pub struct MemorySettings {
    /// Privilege wrapper, e.g. `sudo`. `None` runs the interpreter directly.
    pub elevate: Option<String>,
    pub interpreter: String,
    pub script: PathBuf,
    /// Pause after a remediation so the operator can read the fixer output.
    pub pause: Duration,
}

// ── Optimization mode ─────────────────────────────────────────────────────────

/// Compilation profile handed to the module build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationMode {
    #[default]
    Optimized,
    Vanilla,
}

impl OptimizationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OptimizationMode::Optimized => "optimized",
            OptimizationMode::Vanilla => "vanilla",
        }
    }

    /// Anything but an explicit `optimized` recommendation means vanilla.
    pub fn from_recommendation(s: &str) -> Self {
        match s {
            "optimized" => OptimizationMode::Optimized,
            _ => OptimizationMode::Vanilla,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OptimizationMode::Optimized => "Optimized - Faster Performance (30-45% improvement)",
            OptimizationMode::Vanilla => "Vanilla - Maximum Compatibility",
        }
    }

    pub fn patches(self) -> &'static str {
        match self {
            OptimizationMode::Optimized => "All optimizations + VT-x/EPT + IOMMU",
            OptimizationMode::Vanilla => "Kernel compatibility only",
        }
    }

    pub fn iommu(self) -> &'static str {
        match self {
            OptimizationMode::Optimized => "✓ Automatic (enabled in GRUB)",
            OptimizationMode::Vanilla => "✗ Not configured",
        }
    }

    /// IOMMU setup is part of the optimized profile.
    pub fn configures_iommu(self) -> bool {
        self == OptimizationMode::Optimized
    }
}

// ── Exported artifact ─────────────────────────────────────────────────────────

/// Kernel fields the compilation stage consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelSummary {
    pub full_version: String,
    pub version: String,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub is_current: bool,
}

impl From<&KernelRecord> for KernelSummary {
    fn from(k: &KernelRecord) -> Self {
        KernelSummary {
            full_version: k.full_version.clone(),
            version: k.version.clone(),
            major: k.major,
            minor: k.minor,
            patch: k.patch,
            is_current: k.is_current,
        }
    }
}

/// The hand-off file read by the compilation script.
/// Key names are a contract with that script; do not rename them.
#[derive(Debug, Clone, Serialize)]
pub struct WizardConfig {
    pub selected_kernels: Vec<KernelSummary>,
    pub optimization_mode: OptimizationMode,
    pub hw_capabilities: HwCapabilities,
    pub timestamp: f64,
    pub auto_configure_iommu: bool,
}

impl WizardConfig {
    pub fn new(kernels: &[KernelRecord], mode: OptimizationMode, caps: HwCapabilities) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();

        WizardConfig {
            selected_kernels: kernels.iter().map(KernelSummary::from).collect(),
            optimization_mode: mode,
            hw_capabilities: caps,
            timestamp,
            auto_configure_iommu: mode.configures_iommu(),
        }
    }

    pub fn to_json(&self) -> Result<String, WizardError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Overwrites `path` with the pretty-printed configuration.
    pub fn write(&self, path: &Path) -> Result<(), WizardError> {
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), kernels = self.selected_kernels.len(), "configuration written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn record(full: &str, minor: u32, current: bool) -> KernelRecord {
        KernelRecord {
            full_version: full.to_string(),
            version: format!("6.{}", minor),
            major: 6,
            minor,
            patch: 0,
            headers_installed: true,
            headers_path: PathBuf::from(format!("/lib/modules/{}/build", full)),
            is_current: current,
            supported: true,
        }
    }

    #[test]
    fn iommu_follows_mode() {
        let k = [record("6.17.0-1-generic", 17, true)];
        let opt = WizardConfig::new(&k, OptimizationMode::Optimized, HwCapabilities::default());
        let van = WizardConfig::new(&k, OptimizationMode::Vanilla, HwCapabilities::default());
        assert!(opt.auto_configure_iommu);
        assert!(!van.auto_configure_iommu);
    }

    #[test]
    fn recommendation_strings_map_to_modes() {
        assert_eq!(
            OptimizationMode::from_recommendation("optimized"),
            OptimizationMode::Optimized
        );
        assert_eq!(
            OptimizationMode::from_recommendation("vanilla"),
            OptimizationMode::Vanilla
        );
        assert_eq!(
            OptimizationMode::from_recommendation("OPTIMIZED"),
            OptimizationMode::Vanilla
        );
    }

    #[test]
    fn written_file_uses_downstream_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wizard_config.json");
        fs::write(&path, "stale").unwrap();

        let caps = HwCapabilities::from_value(json!({"cpu": {"vendor": "GenuineIntel"}})).unwrap();
        let config = WizardConfig::new(
            &[record("6.16.2-1-generic", 16, false)],
            OptimizationMode::Vanilla,
            caps,
        );
        config.write(&path).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["optimization_mode"], "vanilla");
        assert_eq!(written["auto_configure_iommu"], false);
        assert_eq!(written["hw_capabilities"]["cpu"]["vendor"], "GenuineIntel");
        assert!(written["timestamp"].as_f64().unwrap() > 0.0);

        let kernel = &written["selected_kernels"][0];
        assert_eq!(kernel["full_version"], "6.16.2-1-generic");
        assert_eq!(kernel["version"], "6.16");
        assert_eq!(kernel["is_current"], false);
        assert!(kernel.get("headers_installed").is_none());
        assert!(kernel.get("supported").is_none());
    }

    #[test]
    fn output_is_indented_json() {
        let config = WizardConfig::new(&[], OptimizationMode::Optimized, HwCapabilities::default());
        let text = config.to_json().unwrap();
        assert!(text.contains("\n  \"optimization_mode\": \"optimized\""));
        assert!(text.contains("\"hw_capabilities\": {}"));
    }
}
