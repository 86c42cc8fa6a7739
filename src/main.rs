mod cmd;
mod config;
mod error;
mod hardware;
mod kernel;
mod memory;
mod steps;
mod ui;

use std::{
    panic,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use dialoguer::Confirm;
use tracing::error;

use config::{MemorySettings, ProbeSettings, Settings};
use error::WizardError;
use kernel::SupportMatrix;
use steps::{WizardState, TOTAL_STEPS};

const PROBE_SCRIPT: &str = "detect_hardware.py";
const MEMORY_SCRIPT: &str = "check_and_fix_memory.py";
const REMEDIATION_PAUSE: Duration = Duration::from_secs(2);

// ── Command line ──────────────────────────────────────────────────────────────

/// Interactive wizard that prepares a VMware host-module build.
#[derive(Debug, Parser)]
#[command(name = "vmware-wizard", version, about)]
struct Cli {
    /// Skip the root check and the memory pre-check; print the
    /// configuration instead of writing it.
    #[arg(long)]
    dry_run: bool,

    /// Directory holding one subdirectory per installed kernel.
    #[arg(long, default_value = "/lib/modules")]
    modules_dir: PathBuf,

    /// Where the configuration for the compilation stage is written.
    #[arg(long, default_value = "/tmp/vmware_wizard_config.json")]
    output: PathBuf,

    /// Directory containing the probe and memory-fixer scripts
    /// (defaults to the directory of this executable).
    #[arg(long)]
    scripts_dir: Option<PathBuf>,

    /// Directory the hardware probe writes its result to.
    #[arg(long, default_value = "/tmp")]
    tmp_dir: PathBuf,

    /// Seconds the hardware probe may run before it is abandoned.
    #[arg(long, default_value_t = 30)]
    probe_timeout: u64,

    /// Interpreter used to launch the helper scripts.
    #[arg(long, default_value = "python3")]
    interpreter: String,

    /// Kernel major version the module build supports.
    #[arg(long, default_value_t = 6)]
    supported_major: u32,

    /// Kernel minor versions the module build supports (repeatable).
    #[arg(long = "supported-minor", default_values_t = [16, 17, 18])]
    supported_minors: Vec<u32>,
}

impl Cli {
    fn into_settings(self) -> Settings {
        let scripts_dir = self.scripts_dir.unwrap_or_else(exe_dir);

        Settings {
            dry_run: self.dry_run,
            modules_dir: self.modules_dir,
            output: self.output,
            support: SupportMatrix {
                major: self.supported_major,
                minors: self.supported_minors,
            },
            probe: ProbeSettings {
                interpreter: self.interpreter.clone(),
                script: scripts_dir.join(PROBE_SCRIPT),
                tmp_dir: self.tmp_dir,
                timeout: Duration::from_secs(self.probe_timeout),
            },
            memory: MemorySettings {
                elevate: Some("sudo".to_string()),
                interpreter: self.interpreter,
                script: scripts_dir.join(MEMORY_SCRIPT),
                pause: REMEDIATION_PAUSE,
            },
        }
    }
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let settings = Cli::parse().into_settings();

    // stderr only, quiet by default so prompts stay readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let outcome = cmd::install_interrupt_handler()
        .and_then(|()| panic::catch_unwind(|| run(&settings)).unwrap_or(Err(WizardError::Internal)));

    match outcome {
        Ok(()) => {}
        Err(WizardError::Cancelled) => {
            // an interrupted prompt leaves the cursor hidden
            let _ = console::Term::stdout().show_cursor();
            println!();
            ui::print_warning("Installation cancelled by user");
            std::process::exit(1);
        }
        Err(e) => {
            println!();
            error!(error = ?e, "wizard aborted");
            ui::print_error(&format!("{}", e));
            if let Some(hint) = e.hint() {
                ui::print_info(hint);
            }
            std::process::exit(1);
        }
    }
}

fn run(settings: &Settings) -> Result<(), WizardError> {
    // ── Guard ─────────────────────────────────────────────────────────────────
    check_root(settings.dry_run)?;

    // ── Memory pre-check (best effort) ────────────────────────────────────────
    if !settings.dry_run {
        memory::precheck(&settings.memory)?;
    }

    // ── Welcome ───────────────────────────────────────────────────────────────
    ui::print_banner(&settings.support.describe());

    if settings.dry_run {
        ui::print_warning("DRY-RUN MODE — no configuration file will be written.");
        println!();
    }

    ui::print_welcome_steps(&[
        "Kernel Detection & Selection",
        "Hardware Detection & Analysis",
        "Optimization Mode Selection (Optimized vs Vanilla + IOMMU)",
        "Module Compilation & Installation",
    ]);

    if !Confirm::new()
        .with_prompt("Ready to start the installation?")
        .default(true)
        .interact()?
    {
        return Err(WizardError::Cancelled);
    }

    let mut state = WizardState::default();

    // ── Step 1: Kernel detection & selection ──────────────────────────────────
    ui::print_step(1, TOTAL_STEPS, "Kernel Detection & Selection");
    steps::kernels::run(settings, &mut state)?;
    cmd::check_interrupted()?;

    // ── Step 2: Hardware detection ────────────────────────────────────────────
    ui::print_step(2, TOTAL_STEPS, "Hardware Detection & Analysis");
    steps::hardware::run(settings, &mut state)?;

    // ── Step 3: Optimization mode ─────────────────────────────────────────────
    ui::print_step(3, TOTAL_STEPS, "Optimization Mode Selection");
    steps::mode::run(&mut state)?;
    cmd::check_interrupted()?;

    // ── Step 4: Review + export ───────────────────────────────────────────────
    ui::print_step(4, TOTAL_STEPS, "Final Review & Confirmation");
    steps::review::run(settings, &state)?;

    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Effective UID from a `/proc/<pid>/status` document.
/// The `Uid:` line lists real, effective, saved and filesystem ids.
fn effective_uid(status: &str) -> Option<u32> {
    status
        .lines()
        .find(|l| l.starts_with("Uid:"))
        .and_then(|l| l.split_whitespace().nth(2))
        .and_then(|v| v.parse::<u32>().ok())
}

/// Checks that the process is running with effective UID 0.
/// Skipped automatically in dry-run mode.
fn check_root(dry_run: bool) -> Result<(), WizardError> {
    if dry_run {
        return Ok(());
    }

    let uid = std::fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|s| effective_uid(&s))
        .unwrap_or(1); // default to non-root if unreadable

    if uid != 0 {
        return Err(WizardError::NotRoot);
    }

    Ok(())
}
