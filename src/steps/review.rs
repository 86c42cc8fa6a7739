use dialoguer::Confirm;

use crate::{
    config::{Settings, WizardConfig},
    error::WizardError,
    steps::WizardState,
    ui,
};

/// Rows of the final plan box.
pub fn plan_rows(state: &WizardState) -> Vec<(&'static str, String)> {
    let kernels: Vec<&str> = state
        .selected
        .iter()
        .map(|k| k.full_version.as_str())
        .collect();

    let mut rows = vec![
        ("Kernels", kernels.join(", ")),
        ("Mode", state.mode.as_str().to_uppercase()),
        ("Patches", state.mode.patches().to_string()),
        ("IOMMU", state.mode.iommu().to_string()),
        ("initramfs", "Updated after compilation".to_string()),
    ];
    rows.extend(
        state
            .selected
            .iter()
            .map(|k| ("Headers", k.headers_path.display().to_string())),
    );
    rows
}

/// Writes the configuration to its well-known path.
pub fn export(settings: &Settings, config: &WizardConfig) -> Result<(), WizardError> {
    config.write(&settings.output)
}

/// In dry-run mode prints the configuration instead of writing it.
pub fn preview_or_export(settings: &Settings, config: &WizardConfig) -> Result<(), WizardError> {
    if settings.dry_run {
        ui::print_warning(&format!(
            "DRY-RUN — not writing {}. Configuration would be:",
            settings.output.display()
        ));
        println!("{}", config.to_json()?);
        return Ok(());
    }

    export(settings, config)?;
    ui::print_success(&format!(
        "Configuration saved to {}",
        settings.output.display()
    ));
    Ok(())
}

/// Step 4: show the plan, ask once more, then hand off the configuration.
pub fn run(settings: &Settings, state: &WizardState) -> Result<(), WizardError> {
    println!();
    ui::print_kv_box("Installation Plan", &plan_rows(state));
    println!();

    if !Confirm::new()
        .with_prompt("Proceed with installation?")
        .default(true)
        .interact()?
    {
        return Err(WizardError::Cancelled);
    }

    println!();
    preview_or_export(settings, &state.to_config())?;
    println!();
    ui::print_info("Next steps: Compilation → IOMMU configuration → initramfs update → Done!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::OptimizationMode, kernel::KernelRecord};
    use std::path::PathBuf;

    #[test]
    fn plan_reflects_mode() {
        let mut state = WizardState::default();
        let rows = plan_rows(&state);
        assert_eq!(rows[1], ("Mode", "OPTIMIZED".to_string()));
        assert!(rows[3].1.contains("Automatic"));

        state.mode = OptimizationMode::Vanilla;
        let rows = plan_rows(&state);
        assert_eq!(rows[1], ("Mode", "VANILLA".to_string()));
        assert_eq!(rows[2].1, "Kernel compatibility only");
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn header_paths_are_part_of_the_plan() {
        let mut state = WizardState::default();
        state.selected = ["6.16.4-1-generic", "6.17.0-3-generic"]
            .iter()
            .map(|full| KernelRecord {
                full_version: full.to_string(),
                version: full[..4].to_string(),
                major: 6,
                minor: full[2..4].parse().unwrap(),
                patch: 0,
                headers_installed: true,
                headers_path: PathBuf::from(format!("/lib/modules/{}/build", full)),
                is_current: false,
                supported: true,
            })
            .collect();

        let rows = plan_rows(&state);
        assert_eq!(rows[0].1, "6.16.4-1-generic, 6.17.0-3-generic");
        let headers: Vec<&str> = rows
            .iter()
            .filter(|(k, _)| *k == "Headers")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(
            headers,
            [
                "/lib/modules/6.16.4-1-generic/build",
                "/lib/modules/6.17.0-3-generic/build"
            ]
        );
    }
}
