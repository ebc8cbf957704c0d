use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::constants::{
    find_bible_version, DEFAULT_BASE_URL, DEFAULT_BIBLE_VERSION, DEFAULT_LANGUAGE, DEFAULT_MODEL,
};

/// Persistent user preferences stored in `config.toml`.
///
/// Every field is optional so a missing or partial file falls back to the
/// built-in defaults through the accessor methods.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Scripture translation used for new sessions (e.g., "NIV")
    pub bible_version: Option<String>,
    /// Language code the assistant answers in (e.g., "en")
    pub language: Option<String>,
    /// Gemini model id
    pub model: Option<String>,
    /// Override for the Gemini REST base URL
    pub base_url: Option<String>,
    /// "dark" or "light"
    pub theme: Option<String>,
    /// Directory holding sessions, study items and devotionals
    pub data_dir: Option<PathBuf>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    /// Configured version if it is one we know, otherwise the default.
    pub fn bible_version(&self) -> &'static str {
        self.bible_version
            .as_deref()
            .and_then(find_bible_version)
            .unwrap_or(DEFAULT_BIBLE_VERSION)
    }

    pub fn language(&self) -> &str {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn light_theme(&self) -> bool {
        self.theme
            .as_deref()
            .is_some_and(|theme| theme.eq_ignore_ascii_case("light"))
    }
}
