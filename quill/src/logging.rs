//! Diagnostic logging.
//!
//! The terminal belongs to the UI, so log records go to `<data_dir>/quill.log`
//! instead. Verbosity comes from `QUILL_LOG` (an `EnvFilter` directive such as
//! `debug` or `quill_core=trace`), defaulting to `info`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const FILTER_ENV: &str = "QUILL_LOG";
const DEFAULT_LEVEL: &str = "info";

/// Installs the global subscriber, appending to `quill.log` in `data_dir`.
///
/// # Errors
///
/// Returns `Err` if the log file cannot be opened or a global subscriber is
/// already installed.
pub fn init(data_dir: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("quill.log"))?;

    let env_filter = EnvFilter::try_from_env(FILTER_ENV)
        .or_else(|_| EnvFilter::try_new(DEFAULT_LEVEL))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(std::io::Error::other)
}
