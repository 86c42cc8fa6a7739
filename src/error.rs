use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Could not encode configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Command '{0}' not found — is it installed?")]
    CommandNotFound(String),

    #[error("Prompt error: {0}")]
    Prompt(dialoguer::Error),

    #[error("Installation cancelled by user")]
    Cancelled,

    #[error("This wizard must be run as root (sudo)")]
    NotRoot,

    #[error("Could not install the Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Unexpected internal error (see the panic message above)")]
    Internal,

    #[error("No kernels detected!")]
    NoKernels,

    #[error("No supported kernels ({supported}) with headers found!")]
    NoEligibleKernels { supported: String },
}

// Ctrl-C inside a prompt surfaces as an interrupted read.
impl From<dialoguer::Error> for WizardError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(ref e) if e.kind() == io::ErrorKind::Interrupted => {
                WizardError::Cancelled
            }
            other => WizardError::Prompt(other),
        }
    }
}

impl WizardError {
    /// Follow-up advice printed under the error line, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            WizardError::NoEligibleKernels { .. } => {
                Some("Please install kernel headers: sudo apt install linux-headers-$(uname -r)")
            }
            WizardError::NoKernels => Some("Nothing usable was found under the module tree root."),
            WizardError::NotRoot => Some("Re-run with: sudo vmware-wizard"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupted_prompt_becomes_cancellation() {
        let err: WizardError =
            dialoguer::Error::IO(io::Error::new(io::ErrorKind::Interrupted, "read interrupted"))
                .into();
        assert!(matches!(err, WizardError::Cancelled));
    }

    #[test]
    fn other_prompt_failures_stay_prompt_errors() {
        let err: WizardError =
            dialoguer::Error::IO(io::Error::new(io::ErrorKind::BrokenPipe, "gone")).into();
        assert!(matches!(err, WizardError::Prompt(_)));
    }

    #[test]
    fn no_kernels_and_no_eligible_read_differently() {
        let none = WizardError::NoKernels.to_string();
        let headers = WizardError::NoEligibleKernels {
            supported: "6.16.x".to_string(),
        };
        assert_ne!(none, headers.to_string());
        assert!(headers.hint().unwrap().contains("linux-headers"));
    }
}
