pub mod hardware;
pub mod kernels;
pub mod mode;
pub mod review;

use crate::{
    config::{OptimizationMode, WizardConfig},
    hardware::HwCapabilities,
    kernel::KernelRecord,
};

pub const TOTAL_STEPS: u8 = 4;

/// Decisions accumulated while the wizard runs. Each step reads what the
/// previous ones left here and fills in its own part.
#[derive(Debug, Default)]
pub struct WizardState {
    pub inventory: Vec<KernelRecord>,
    pub eligible: Vec<KernelRecord>,
    pub selected: Vec<KernelRecord>,
    pub capabilities: HwCapabilities,
    pub mode: OptimizationMode,
}

impl WizardState {
    pub fn to_config(&self) -> WizardConfig {
        WizardConfig::new(&self.selected, self.mode, self.capabilities.clone())
    }
}
