use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const RULE_WIDTH: usize = 60;

// ── Terminal helpers ──────────────────────────────────────────────────────────

fn term_width() -> usize {
    Term::stdout().size().1.max(60) as usize
}

fn rule() {
    println!("{}", style("─".repeat(term_width().min(RULE_WIDTH))).dim());
}

// ── Banner ────────────────────────────────────────────────────────────────────

pub fn print_banner(supported: &str) {
    let _ = Term::stdout().clear_screen();

    println!();
    println!(
        "   {}  {}",
        style("⚙").cyan().bold(),
        style("VMware Module Installation Wizard").cyan().bold()
    );
    println!();
    println!(
        "{}",
        style(format!(
            "   Automated Kernel Module Compilation for Linux {}  ·  v{}",
            supported,
            env!("CARGO_PKG_VERSION")
        ))
        .dim()
        .italic()
    );
    println!();
    rule();
    println!();
}

/// Numbered overview of what the wizard is about to do.
pub fn print_welcome_steps(steps: &[&str]) {
    println!("  {}", style("Installation steps").white().bold());
    for (i, step) in steps.iter().enumerate() {
        println!("  {}  {}", style(format!("{}.", i + 1)).cyan().bold(), step);
    }
    println!();
}

// ── Step header ───────────────────────────────────────────────────────────────

/// Prints a visually distinct numbered step header.
pub fn print_step(step: u8, total: u8, title: &str) {
    println!();
    let tag = style(format!(" {}/{} ", step, total)).black().on_cyan().bold();
    let heading = style(format!("  {}", title)).white().bold();
    println!("{}{}", tag, heading);
    rule();
}

// ── Feedback messages ─────────────────────────────────────────────────────────

/// Green ✓ — operation completed successfully.
pub fn print_success(msg: &str) {
    println!("  {}  {}", style("✓").green().bold(), style(msg).green());
}

/// Blue → — neutral info / progress note.
pub fn print_info(msg: &str) {
    println!("  {}  {}", style("→").blue().bold(), msg);
}

/// Yellow ⚠  — non-fatal notice.
pub fn print_warning(msg: &str) {
    println!("  {}  {}", style("⚠").yellow().bold(), style(msg).yellow());
}

/// Red ✗ — error (written to stderr).
pub fn print_error(msg: &str) {
    eprintln!("  {}  {}", style("✗").red().bold(), style(msg).red());
}

// ── Info box ──────────────────────────────────────────────────────────────────

/// Renders a bordered key→value box in the terminal.
///
/// ```text
/// ┌─ Installation Plan ───────────────────────┐
/// │  Kernels      6.17.0-3-generic            │
/// │  Mode         OPTIMIZED                   │
/// └───────────────────────────────────────────┘
/// ```
pub fn print_kv_box<K: AsRef<str>, V: AsRef<str>>(title: &str, rows: &[(K, V)]) {
    const BOX_INNER: usize = 46;

    let dashes = "─".repeat(BOX_INNER.saturating_sub(title.chars().count() + 2));
    println!(
        "  ┌─ {} {}┐",
        style(title).white().bold(),
        style(&dashes).dim()
    );

    for (key, val) in rows {
        println!(
            "  │  {:<15}{}",
            style(key.as_ref()).dim(),
            style(val.as_ref()).white().bold()
        );
    }

    println!("  └{}┘", style("─".repeat(BOX_INNER + 2)).dim());
}

// ── Comparison table ──────────────────────────────────────────────────────────

/// Two feature columns side by side, padded to the longer one.
pub fn print_comparison(title: &str, left: (&str, &[&str]), right: (&str, &[&str])) {
    const COL: usize = 48;

    println!("  {}", style(title).white().bold());
    println!();
    println!(
        "  {}{}",
        style(format!("{:<width$}", left.0, width = COL)).green().bold(),
        style(right.0).blue().bold()
    );
    println!("  {}", style("─".repeat(COL * 2)).dim());

    let rows = left.1.len().max(right.1.len());
    for i in 0..rows {
        let l = left.1.get(i).copied().unwrap_or("");
        let r = right.1.get(i).copied().unwrap_or("");
        // pad by chars, not bytes; the bullets are multi-byte
        let pad = COL.saturating_sub(l.chars().count());
        println!("  {}{}{}", l, " ".repeat(pad), style(r).dim());
    }
}

// ── Spinner ───────────────────────────────────────────────────────────────────

/// Returns a running braille spinner.
/// Call `pb.finish_and_clear()` (or the `done_spinner` helper) when done.
pub fn spinner(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("  {spinner:.cyan.bold}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Clears the spinner and prints a success message in its place.
pub fn done_spinner(pb: ProgressBar, msg: &str) {
    pb.finish_and_clear();
    print_success(msg);
}
