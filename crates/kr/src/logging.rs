//! Tracing setup for the binary.
//!
//! Logs go to stderr. A full-screen view pauses them while it owns the
//! terminal, since raw mode and the alternate screen would be overwritten.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

static STDERR_PAUSED: AtomicBool = AtomicBool::new(false);

pub fn init(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr.with_filter(|_: &tracing::Metadata<'_>| !is_paused()))
        .init();
}

fn is_paused() -> bool {
    STDERR_PAUSED.load(Ordering::Relaxed)
}

/// Discard log output until the guard is dropped.
pub fn pause_stderr() -> PausedStderr {
    STDERR_PAUSED.store(true, Ordering::Relaxed);
    PausedStderr
}

#[must_use = "logging resumes when the guard is dropped"]
pub struct PausedStderr;

impl Drop for PausedStderr {
    fn drop(&mut self) {
        STDERR_PAUSED.store(false, Ordering::Relaxed);
    }
}
