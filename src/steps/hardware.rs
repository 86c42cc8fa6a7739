use crate::{
    config::Settings,
    error::WizardError,
    hardware::{self, ProbeOutcome},
    steps::WizardState,
    ui,
};

/// Step 2: run the hardware probe. A broken probe just leaves the
/// capabilities empty; only Ctrl-C stops the wizard here.
pub fn detect(settings: &Settings, state: &mut WizardState) -> Result<ProbeOutcome, WizardError> {
    let outcome = hardware::probe(&settings.probe)?;
    state.capabilities = outcome.clone().into_capabilities();
    Ok(outcome)
}

pub fn run(settings: &Settings, state: &mut WizardState) -> Result<(), WizardError> {
    let pb = ui::spinner("Analyzing your hardware…");
    let outcome = match detect(settings, state) {
        Ok(outcome) => outcome,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    match outcome {
        ProbeOutcome::Detected(caps) if caps.is_empty() => {
            pb.finish_and_clear();
            ui::print_warning("Hardware detection returned no data.");
        }
        ProbeOutcome::Detected(caps) => {
            ui::done_spinner(pb, "Hardware analysis complete.");
            let rows = caps.summary_rows();
            if !rows.is_empty() {
                println!();
                ui::print_kv_box("Hardware Summary", &rows);
            }
        }
        ProbeOutcome::Unavailable(reason) => {
            pb.finish_and_clear();
            ui::print_warning(&reason);
            ui::print_info("Continuing without hardware-specific recommendations.");
        }
    }
    Ok(())
}
