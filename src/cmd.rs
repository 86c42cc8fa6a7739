use std::{
    io,
    os::unix::process::ExitStatusExt,
    process::{Command, ExitStatus, Stdio},
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::error::WizardError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const SIGINT: i32 = 2;

/// Set by the Ctrl-C handler; checked while waiting on children and
/// between wizard steps.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

// ── Interrupt handling ────────────────────────────────────────────────────────

/// Routes SIGINT into a flag instead of killing the wizard outright.
/// Prompts are unaffected: they read Ctrl-C as a key in raw mode.
pub fn install_interrupt_handler() -> Result<(), WizardError> {
    ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst))?;
    Ok(())
}

/// Returns `Cancelled` once Ctrl-C has been pressed.
pub fn check_interrupted() -> Result<(), WizardError> {
    if INTERRUPTED.load(Ordering::SeqCst) {
        return Err(WizardError::Cancelled);
    }
    Ok(())
}

/// A child shares our process group, so it sees the same Ctrl-C.
fn interrupted_child(status: &ExitStatus) -> bool {
    status.signal() == Some(SIGINT)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn not_found_or_io(program: &str, err: io::Error) -> WizardError {
    if err.kind() == io::ErrorKind::NotFound {
        WizardError::CommandNotFound(program.to_string())
    } else {
        WizardError::Io(err)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// How a time-bounded command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounded {
    /// The child exited on its own. `pid` is the id it ran under.
    Exited { status: ExitStatus, pid: u32 },
    /// The child overran its budget and was killed.
    TimedOut,
}

/// Run a command **silently** and wait at most `timeout` for it.
/// An overrunning child is killed and reaped before returning.
/// Ctrl-C while waiting kills the child and yields `Cancelled`.
pub fn run_bounded(program: &str, args: &[&str], timeout: Duration) -> Result<Bounded, WizardError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| not_found_or_io(program, e))?;

    let pid = child.id();
    let deadline = Instant::now() + timeout;
    debug!(program, pid, ?timeout, "spawned bounded command");

    loop {
        if let Some(status) = child.try_wait()? {
            if interrupted_child(&status) {
                return Err(WizardError::Cancelled);
            }
            check_interrupted()?;
            return Ok(Bounded::Exited { status, pid });
        }
        if check_interrupted().is_err() {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WizardError::Cancelled);
        }
        if Instant::now() >= deadline {
            warn!(program, pid, "command exceeded its time budget, killing it");
            let _ = child.kill();
            let _ = child.wait();
            return Ok(Bounded::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Run a command that **takes over the terminal** (stdin/stdout/stderr inherited)
/// and hand back its exit status without judging it, unless Ctrl-C ended it.
pub fn run_interactive(program: &str, args: &[&str]) -> Result<ExitStatus, WizardError> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| not_found_or_io(program, e))?;

    if interrupted_child(&status) {
        return Err(WizardError::Cancelled);
    }
    check_interrupted()?;
    Ok(status)
}
