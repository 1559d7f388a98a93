//! File-based tracing setup.
//!
//! The terminal belongs to the TUI, so events are appended to a log file in
//! the data directory instead of stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "DEVPORTAL_LOG";

/// File name of the log inside the data directory.
pub const LOG_FILE_NAME: &str = "devportal.log";

/// Pick the effective filter: explicit override first, then the configured default.
pub fn resolve_filter(override_directive: Option<&str>, default_directive: &str) -> Result<EnvFilter> {
    let directive = override_directive
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(default_directive);
    EnvFilter::try_new(directive).with_context(|| format!("Invalid log filter: {directive}"))
}

/// Install the global subscriber writing to `path`.
pub fn init_file_logging(path: &Path, default_directive: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file at {}", path.display()))?;

    let env_directive = std::env::var(LOG_ENV).ok();
    let filter = resolve_filter(env_directive.as_deref(), default_directive)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))?;

    Ok(())
}
