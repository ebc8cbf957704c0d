//! `set` / `unset` for the preferences stored in `config.toml`.
//!
//! Every key is a [`SettingHandler`]; the [`SettingRegistry`] maps the
//! command-line key to its handler and fixes the order `bible-expert set`
//! prints them in.

pub mod error;
pub mod handlers;
pub mod registry;

use std::path::Path;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::data::{path_display, Config};

pub trait SettingHandler: Send + Sync {
    fn key(&self) -> &'static str;

    /// Validate `args` and write the value into `config`. Returns the
    /// message to print.
    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError>;

    fn unset(&self, config: &mut Config) -> String;

    /// One `  key: value` line for the settings listing.
    fn format(&self, config: &Config) -> String;
}

fn load(config_path: &Path) -> Result<Config, SettingError> {
    Config::load_from_path(config_path).map_err(|err| SettingError::ConfigError(err.to_string()))
}

fn save(config: &Config, config_path: &Path) -> Result<(), SettingError> {
    config
        .save_to_path(config_path)
        .map_err(|err| SettingError::ConfigError(err.to_string()))
}

pub fn run_set(
    registry: &SettingRegistry,
    config_path: &Path,
    key: &str,
    args: &[String],
) -> Result<String, SettingError> {
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
    let mut config = load(config_path)?;
    let message = handler.set(args, &mut config)?;
    save(&config, config_path)?;
    Ok(message)
}

pub fn run_unset(
    registry: &SettingRegistry,
    config_path: &Path,
    key: &str,
) -> Result<String, SettingError> {
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
    let mut config = load(config_path)?;
    let message = handler.unset(&mut config);
    save(&config, config_path)?;
    Ok(message)
}

/// The listing printed by a bare `bible-expert set`.
pub fn describe(registry: &SettingRegistry, config: &Config, config_path: &Path) -> Vec<String> {
    let mut lines = vec![format!("Configuration ({}):", path_display(config_path))];
    for key in registry.keys_display_order() {
        if let Some(handler) = registry.get(key) {
            lines.push(handler.format(config));
        }
    }
    lines.push(match &config.data_dir {
        Some(dir) => format!("  data-dir: {}", path_display(dir)),
        None => "  data-dir: (unset, platform default)".to_string(),
    });
    lines
}
