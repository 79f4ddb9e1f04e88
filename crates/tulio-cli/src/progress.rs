//! Progress reporting on stderr

use std::io::{self, Write};
use std::time::Instant;

/// Single-line status reporter for long-running commands
pub struct ProgressReporter {
    started: Instant,
    quiet: bool,
}

impl ProgressReporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            started: Instant::now(),
            quiet,
        }
    }

    pub fn set_message(&self, msg: &str) {
        if self.quiet {
            return;
        }
        eprint!("\r{:<60}", msg);
        io::stderr().flush().ok();
    }

    pub fn finish(&self, msg: &str) {
        if self.quiet {
            return;
        }
        eprintln!(
            "\r{:<60}",
            format!("{} ({:.1}s)", msg, self.started.elapsed().as_secs_f64())
        );
    }
}
