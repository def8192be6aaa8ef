use std::time::Instant;

use crate::error::TabliteError;

/// Print an error to stderr in the contract format: `tablite: <message>`.
/// Exit status is the caller's problem.
pub fn print_error(err: &TabliteError) {
    eprintln!("tablite: {err}");
}

/// Emit a diagnostic line to stderr when verbose mode is on.
pub fn diag(verbose: bool, msg: &str) {
    if verbose {
        eprintln!("[tablite] {msg}");
    }
}

/// Wall-clock timer for verbose timings.
pub struct Timer {
    started: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}
