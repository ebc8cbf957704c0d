//! Handlers for the string-valued preferences.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::SettingHandler;
use crate::core::config::data::Config;
use crate::core::constants::{
    find_bible_version, find_language, language_name, BIBLE_VERSIONS, DEFAULT_BASE_URL,
    DEFAULT_BIBLE_VERSION, DEFAULT_LANGUAGE, DEFAULT_MODEL, LANGUAGES,
};
use crate::utils::url::normalize_base_url;

/// Data-driven handler for a single optional string field.
pub struct StringHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: &'static str,
    /// Canonicalize user input, or explain what is allowed.
    parse: fn(&str) -> Result<String, String>,
    get: fn(&Config) -> Option<&str>,
    set_field: fn(&mut Config, Option<String>),
}

impl SettingHandler for StringHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let input = args.join(" ");
        let input = input.trim();
        if input.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let value = (self.parse)(input).map_err(|hint| SettingError::InvalidValue {
            key: self.key,
            input: input.to_string(),
            hint,
        })?;
        let message = format!("✅ Set {} to: {value}", self.key);
        (self.set_field)(config, Some(value));
        Ok(message)
    }

    fn unset(&self, config: &mut Config) -> String {
        (self.set_field)(config, None);
        format!(
            "✅ Unset {} (will use default: {})",
            self.key, self.default_display
        )
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {value}", self.key),
            None => format!("  {}: (unset, default: {})", self.key, self.default_display),
        }
    }
}

fn parse_bible_version(input: &str) -> Result<String, String> {
    find_bible_version(input).map(str::to_string).ok_or_else(|| {
        let codes: Vec<&str> = BIBLE_VERSIONS.iter().map(|(code, _)| *code).collect();
        format!("Available versions: {}", codes.join(", "))
    })
}

fn parse_language(input: &str) -> Result<String, String> {
    find_language(input).map(str::to_string).ok_or_else(|| {
        let codes: Vec<String> = LANGUAGES
            .iter()
            .map(|(code, _)| format!("{code} ({})", language_name(code)))
            .collect();
        format!("Available languages: {}", codes.join(", "))
    })
}

fn parse_theme(input: &str) -> Result<String, String> {
    match input.to_ascii_lowercase().as_str() {
        "dark" => Ok("dark".to_string()),
        "light" => Ok("light".to_string()),
        _ => Err("Use 'dark' or 'light'".to_string()),
    }
}

fn parse_base_url(input: &str) -> Result<String, String> {
    if input.starts_with("http://") || input.starts_with("https://") {
        Ok(normalize_base_url(input))
    } else {
        Err("The base URL must start with http:// or https://".to_string())
    }
}

pub fn bible_version_handler() -> StringHandler {
    StringHandler {
        key: "bible-version",
        hint: "To set the Scripture version, name one of KJV, NIV, ESV, NLT, NKJV:",
        example: "bible-expert set bible-version ESV",
        default_display: DEFAULT_BIBLE_VERSION,
        parse: parse_bible_version,
        get: |c| c.bible_version.as_deref(),
        set_field: |c, v| c.bible_version = v,
    }
}

pub fn language_handler() -> StringHandler {
    StringHandler {
        key: "language",
        hint: "To set the answer language, give its code:",
        example: "bible-expert set language es",
        default_display: DEFAULT_LANGUAGE,
        parse: parse_language,
        get: |c| c.language.as_deref(),
        set_field: |c, v| c.language = v,
    }
}

pub fn model_handler() -> StringHandler {
    StringHandler {
        key: "model",
        hint: "To set the Gemini model, give its id:",
        example: "bible-expert set model gemini-2.5-pro",
        default_display: DEFAULT_MODEL,
        parse: |input| Ok(input.to_string()),
        get: |c| c.model.as_deref(),
        set_field: |c, v| c.model = v,
    }
}

pub fn theme_handler() -> StringHandler {
    StringHandler {
        key: "theme",
        hint: "To set the theme, specify dark or light:",
        example: "bible-expert set theme light",
        default_display: "dark",
        parse: parse_theme,
        get: |c| c.theme.as_deref(),
        set_field: |c, v| c.theme = v,
    }
}

pub fn base_url_handler() -> StringHandler {
    StringHandler {
        key: "base-url",
        hint: "To point at another Gemini endpoint, give its base URL:",
        example: "bible-expert set base-url https://generativelanguage.googleapis.com/v1beta",
        default_display: DEFAULT_BASE_URL,
        parse: parse_base_url,
        get: |c| c.base_url.as_deref(),
        set_field: |c, v| c.base_url = v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn bible_version_is_canonicalized() {
        let mut config = Config::default();
        let message = bible_version_handler()
            .set(&args(&["esv"]), &mut config)
            .expect("valid version");
        assert_eq!(config.bible_version.as_deref(), Some("ESV"));
        assert_eq!(message, "✅ Set bible-version to: ESV");
    }

    #[test]
    fn unknown_version_lists_choices() {
        let mut config = Config::default();
        match bible_version_handler().set(&args(&["Vulgate"]), &mut config) {
            Err(SettingError::InvalidValue { hint, .. }) => assert!(hint.contains("NKJV")),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(config.bible_version.is_none());
    }

    #[test]
    fn missing_value_shows_example() {
        let mut config = Config::default();
        assert!(matches!(
            theme_handler().set(&[], &mut config),
            Err(SettingError::MissingArgs { .. })
        ));
    }

    #[test]
    fn unset_restores_default_display() {
        let mut config = Config {
            theme: Some("light".into()),
            ..Default::default()
        };
        let handler = theme_handler();
        assert_eq!(handler.format(&config), "  theme: light");
        handler.unset(&mut config);
        assert_eq!(handler.format(&config), "  theme: (unset, default: dark)");
    }

    #[test]
    fn base_url_requires_scheme() {
        let mut config = Config::default();
        assert!(base_url_handler()
            .set(&args(&["localhost:8080"]), &mut config)
            .is_err());
        base_url_handler()
            .set(&args(&["http://localhost:8080/v1beta/"]), &mut config)
            .expect("valid url");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1beta"));
    }
}
