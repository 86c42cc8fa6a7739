use console::style;
use dialoguer::Select;
use tracing::info;

use crate::{
    config::Settings,
    error::WizardError,
    kernel::{self, KernelChoice},
    steps::WizardState,
    ui,
};

/// Builds the inventory and keeps only the kernels we can compile for.
pub fn load(settings: &Settings, running: &str, state: &mut WizardState) -> Result<(), WizardError> {
    state.inventory = kernel::scan(&settings.modules_dir, running, &settings.support)?;
    info!(found = state.inventory.len(), running, "kernel inventory built");
    state.eligible = kernel::eligible_or_err(&state.inventory, &settings.support)?;
    Ok(())
}

pub fn apply_choice(state: &mut WizardState, choice: KernelChoice) {
    state.selected = choice.resolve(&state.eligible);
}

/// Step 1: detect installed kernels and let the operator pick one or all.
pub fn run(settings: &Settings, state: &mut WizardState) -> Result<(), WizardError> {
    let running = kernel::running_release();
    load(settings, &running, state)?;

    let skipped = state.inventory.len() - state.eligible.len();
    ui::print_info(&format!(
        "Found {} supported kernel(s) with headers",
        state.eligible.len()
    ));
    if skipped > 0 {
        ui::print_warning(&format!(
            "{} other kernel(s) skipped (unsupported or missing headers)",
            skipped
        ));
    }
    println!();

    let mut labels: Vec<String> = state.eligible.iter().map(|k| k.display()).collect();
    labels.push(style("  All supported kernels with headers").cyan().to_string());

    let idx = Select::new()
        .with_prompt("Which kernel do you want to compile modules for?")
        .items(&labels)
        .default(kernel::default_index(&state.eligible))
        .interact()?;

    apply_choice(state, KernelChoice::from_index(idx, state.eligible.len()));

    ui::print_success(&format!(
        "Selected {} kernel(s) for compilation",
        state.selected.len()
    ));
    for k in &state.selected {
        ui::print_info(&format!("  • {} (kernel {})", k.full_version, k.version));
    }

    Ok(())
}
