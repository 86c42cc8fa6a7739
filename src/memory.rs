use std::{process::ExitStatus, thread};

use tracing::{debug, info, warn};

use crate::{cmd, config::MemorySettings, error::WizardError};

/// What the memory / huge-page fixer reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryCheck {
    /// Exit 0: a problem was found and fixed.
    Remediated,
    /// Exit 1: nothing to fix.
    Clean,
    /// Any other exit; ignored.
    Failed(Option<i32>),
    /// The fixer is absent or could not be started.
    Skipped,
}

impl MemoryCheck {
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(0) => MemoryCheck::Remediated,
            Some(1) => MemoryCheck::Clean,
            code => MemoryCheck::Failed(code),
        }
    }
}

/// Runs the fixer with the terminal handed over so its report is visible.
/// Failures never stop the wizard; only Ctrl-C comes back as an error.
pub fn precheck(settings: &MemorySettings) -> Result<MemoryCheck, WizardError> {
    if !settings.script.exists() {
        debug!(script = %settings.script.display(), "memory fixer not installed");
        return Ok(MemoryCheck::Skipped);
    }

    let script = settings.script.to_string_lossy();
    let result = match settings.elevate.as_deref() {
        Some(wrapper) => cmd::run_interactive(wrapper, &[settings.interpreter.as_str(), &*script]),
        None => cmd::run_interactive(&settings.interpreter, &[&*script]),
    };

    let check = match result {
        Ok(status) => MemoryCheck::from_status(status),
        Err(WizardError::Cancelled) => return Err(WizardError::Cancelled),
        Err(e) => {
            warn!(error = %e, "memory pre-check could not run");
            return Ok(MemoryCheck::Skipped);
        }
    };

    match check {
        MemoryCheck::Remediated => {
            info!("memory saturation remediated");
            thread::sleep(settings.pause);
            cmd::check_interrupted()?;
        }
        MemoryCheck::Failed(code) => warn!(?code, "memory fixer reported an error, continuing"),
        _ => debug!(?check, "memory pre-check finished"),
    }

    Ok(check)
}
