//! Diagnostic logging setup.
//!
//! With `--log <file>` every event at `debug` and above is appended to that
//! file. Otherwise warnings go to stderr. `RUST_LOG` overrides the level in
//! both cases.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const FILE_LEVEL: &str = "codeaide=debug";
const STDERR_LEVEL: &str = "warn";

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Calling this twice is harmless; the second
/// call keeps the first subscriber.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    let installed = match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter_or(FILE_LEVEL))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter_or(STDERR_LEVEL))
            .with_writer(io::stderr)
            .with_target(false)
            .try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(file = ?log_file.map(Path::display), "Logging initialized");
    }
    Ok(())
}
