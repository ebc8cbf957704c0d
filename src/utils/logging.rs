//! Diagnostic logging to a file in the data directory.
//!
//! The interactive UI owns the terminal, so tracing output never goes to
//! stdout/stderr. The filter comes from `BIBLE_EXPERT_LOG`, then `RUST_LOG`,
//! then defaults to `warn`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::core::constants::LOG_FILTER_ENV;

pub const LOG_FILE_NAME: &str = "bible-expert.log";
const DEFAULT_FILTER: &str = "warn";

fn filter_directives(primary: Option<String>, fallback: Option<String>) -> String {
    primary
        .or(fallback)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

fn env_filter() -> EnvFilter {
    let directives = filter_directives(
        std::env::var(LOG_FILTER_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
    );
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn log_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE_NAME)
}

/// Install the global subscriber. Failures are returned for the caller to
/// report; they are never fatal.
pub fn init(data_dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    fs::create_dir_all(data_dir)?;
    let path = log_file_path(data_dir);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| err as Box<dyn std::error::Error>)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_variable_wins_over_rust_log() {
        assert_eq!(
            filter_directives(Some("debug".into()), Some("trace".into())),
            "debug"
        );
        assert_eq!(filter_directives(None, Some("info".into())), "info");
    }

    #[test]
    fn blank_or_missing_filters_default_to_warn() {
        assert_eq!(filter_directives(None, None), "warn");
        assert_eq!(filter_directives(Some("  ".into()), None), "warn");
    }

    #[test]
    fn log_file_lives_in_data_dir() {
        let path = log_file_path(Path::new("/tmp/bible"));
        assert_eq!(path, PathBuf::from("/tmp/bible/bible-expert.log"));
    }
}
