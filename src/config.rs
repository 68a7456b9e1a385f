//! Environment-driven configuration for the almanac helpers.
//!
//! Explicit command-line values always win; `ALMANAC_FILE` supplies the
//! declaration document otherwise, falling back to `almanac.json` in the
//! current directory. `ALMANAC_LOG` is an `EnvFilter` directive string.

use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const ALMANAC_FILE_ENV: &str = "ALMANAC_FILE";
pub const ALMANAC_LOG_ENV: &str = "ALMANAC_LOG";
pub const DEFAULT_ALMANAC_FILE: &str = "almanac.json";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Locate the declaration document to load.
pub fn resolve_almanac_path(explicit: Option<&Path>) -> PathBuf {
    resolve_almanac_path_from(explicit, env::var(ALMANAC_FILE_ENV).ok())
}

fn resolve_almanac_path_from(explicit: Option<&Path>, env_value: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    env_value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ALMANAC_FILE))
}

/// Install a stderr `tracing` subscriber filtered by `ALMANAC_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(ALMANAC_LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
