use console::style;
use dialoguer::Select;

use crate::{config::OptimizationMode, error::WizardError, steps::WizardState, ui};

const OPTIMIZED_FEATURES: &[&str] = &[
    "✓ 30-45% better performance",
    "✓ CPU-specific optimizations (AVX-512, AVX2, AES-NI)",
    "✓ Enhanced VT-x/EPT features",
    "✓ IOMMU auto-configuration (VT-d/AMD-Vi)",
    "✓ Better Wayland integration",
    "✓ Branch prediction hints + cache alignment",
    "⚠ Modules only work on your CPU architecture",
];

const VANILLA_FEATURES: &[&str] = &[
    "• Baseline performance",
    "• No hardware-specific optimizations",
    "• Standard VMware compilation",
    "• No IOMMU auto-configuration",
    "• Works on any x86_64 CPU",
    "• Only kernel compatibility patches",
    "✓ Safe for module sharing",
];

const CHOICES: [OptimizationMode; 2] = [OptimizationMode::Optimized, OptimizationMode::Vanilla];

/// `88.5/100`, `50/100`: the score as the hardware report gave it.
pub fn score_text(score: f64) -> String {
    format!("{}/100", score)
}

/// Selector position of `mode`.
pub fn index_of(mode: OptimizationMode) -> usize {
    CHOICES.iter().position(|m| *m == mode).unwrap_or(0)
}

/// Step 3: compare the two profiles and let the operator choose.
/// The probe's recommendation is only the default.
pub fn run(state: &mut WizardState) -> Result<(), WizardError> {
    let rec = state.capabilities.recommendation();

    ui::print_comparison(
        "Compilation Mode Comparison",
        ("OPTIMIZED", OPTIMIZED_FEATURES),
        ("VANILLA", VANILLA_FEATURES),
    );
    println!();
    println!(
        "  {}  {} mode (optimization score: {})",
        style("Recommendation:").white().bold(),
        style(rec.mode.as_str().to_uppercase()).cyan().bold(),
        score_text(rec.score)
    );
    println!();

    let labels: Vec<&str> = CHOICES.iter().map(|m| m.label()).collect();
    let idx = Select::new()
        .with_prompt("Which compilation mode do you want to use?")
        .items(&labels)
        .default(index_of(rec.mode))
        .interact()?;

    state.mode = CHOICES[idx];
    ui::print_success(&format!(
        "Selected: {} mode",
        state.mode.as_str().to_uppercase()
    ));
    Ok(())
}
