//! Gemini API key resolution and keyring storage.

use keyring::Entry;
use std::error::Error;
use tracing::{debug, warn};

use crate::core::constants::API_KEY_ENV;
use crate::core::keyring::KeyringAccessError;
use crate::utils::line_editor::prompt_masked;

const KEYRING_SERVICE: &str = "bible-expert";
const KEYRING_USER: &str = "gemini";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Keyring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub key: String,
    pub source: KeySource,
}

/// Explanation shown when no key can be found.
pub fn missing_key_message() -> String {
    format!(
        "Gemini API key not configured.\n\nSet the {API_KEY_ENV} environment variable, or run \
`bible-expert auth` to store a key in your system keyring."
    )
}

pub struct AuthManager {
    use_keyring: bool,
}

impl AuthManager {
    pub fn new() -> Self {
        Self::new_with_keyring(true)
    }

    /// Construct a manager, optionally never touching the keyring.
    pub fn new_with_keyring(use_keyring: bool) -> Self {
        Self { use_keyring }
    }

    /// The environment wins over the keyring. A recoverable keyring outage is
    /// treated as "no key stored".
    pub fn resolve_api_key(&self) -> Result<Option<ApiKey>, KeyringAccessError> {
        self.resolve_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_with_env(&self, env_value: Option<String>) -> Result<Option<ApiKey>, KeyringAccessError> {
        if let Some(key) = env_value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            debug!("using API key from environment");
            return Ok(Some(ApiKey {
                key,
                source: KeySource::Environment,
            }));
        }

        match self.get_stored_key() {
            Ok(Some(key)) => Ok(Some(ApiKey {
                key,
                source: KeySource::Keyring,
            })),
            Ok(None) => Ok(None),
            Err(err) if err.is_recoverable() => {
                warn!("{err}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn get_stored_key(&self) -> Result<Option<String>, KeyringAccessError> {
        if !self.use_keyring {
            return Ok(None);
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.get_password() {
            Ok(key) => Ok(Some(key)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn store_key(&self, key: &str) -> Result<(), KeyringAccessError> {
        if !self.use_keyring {
            return Ok(());
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        entry.set_password(key)?;
        Ok(())
    }

    /// Remove the stored key. Returns false when there was nothing to remove.
    pub fn remove_key(&self) -> Result<bool, KeyringAccessError> {
        if !self.use_keyring {
            return Ok(false);
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub fn interactive_auth(&self) -> Result<(), Box<dyn Error>> {
        println!("Bible Expert authentication");
        println!("Get a key at https://aistudio.google.com/apikey");
        println!();
        let key = prompt_masked("Gemini API key: ")?;
        if key.is_empty() {
            return Err("API key cannot be empty".into());
        }
        self.store_key(&key)?;
        println!("✓ API key stored in the system keyring.");
        Ok(())
    }

    pub fn deauth(&self) -> Result<(), Box<dyn Error>> {
        if self.remove_key()? {
            println!("✓ API key removed from the system keyring.");
        } else {
            println!("No stored API key found.");
        }
        Ok(())
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}
