//! Command-line interface parsing and handling
//!
//! Parses arguments with `clap`, resolves configuration, credentials and the
//! data directory, then dispatches to the interactive UI or one of the
//! non-interactive subcommands.

pub mod devotional;
pub mod say;
pub mod settings;


use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::api::client::GeminiClient;
use crate::auth::{missing_key_message, AuthManager};
use crate::core::app::{App, AppInitConfig, Preferences};
use crate::core::config::data::path_display;
use crate::core::config::Config;
use crate::core::constants::{find_bible_version, find_language, BIBLE_VERSIONS};
use crate::core::generation::GeminiGenerator;
use crate::core::storage::LocalStore;
use crate::ui::chat_loop::run_chat;
use crate::ui::config_error::run_config_error;
use crate::ui::theme::Theme;
use crate::utils::logging;
use settings::{describe, run_set, run_unset, SettingRegistry};

/// Exit status for missing credentials.
const EXIT_MISSING_KEY: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "bible-expert")]
#[command(version)]
#[command(about = "A terminal Bible study assistant powered by Gemini")]
#[command(
    long_about = "Bible Expert is a full-screen terminal assistant that answers questions \
about the Bible, keeps a study collection of saved answers enriched with keywords and \
cross references, and prepares a short devotional each day.\n\n\
Authentication:\n\
  Set GEMINI_API_KEY, or run 'bible-expert auth' to store a key in your system keyring.\n\n\
Controls:\n\
  Enter             Send the message or run a /command\n\
  Tab / Shift+Tab   Switch between Chat, Study and Devotional\n\
  Alt+Up/Alt+Down   Switch chat session\n\
  Ctrl+N            Start a new chat\n\
  Ctrl+S            Save the last reply to your study collection\n\
  Ctrl+G            Prepare today's devotional\n\
  F1 or /help       Show help\n\
  Ctrl+C            Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Scripture version for new sessions (KJV, NIV, ESV, NLT, NKJV)
    #[arg(short = 'b', long, global = true, value_name = "VERSION")]
    pub bible_version: Option<String>,

    /// Language code the assistant answers in (e.g. en, es)
    #[arg(short = 'L', long, global = true, value_name = "CODE")]
    pub language: Option<String>,

    /// Gemini model id
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Directory holding sessions, study items and devotionals
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Ask one question and stream the answer to stdout
    Say {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Print today's devotional, preparing it first if needed
    Devotional,
    /// Store a Gemini API key in the system keyring
    Auth,
    /// Remove the stored Gemini API key
    Deauth,
    /// Set a configuration value, or list them all when no key is given
    Set {
        key: Option<String>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a configuration value to its default
    Unset { key: String },
}

/// Everything a command needs once config and overrides are applied.
pub(crate) struct Prepared {
    pub config: Config,
    pub config_path: PathBuf,
    pub preferences: Preferences,
    pub store: LocalStore,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    match args.command.clone().unwrap_or(Commands::Chat) {
        Commands::Auth => {
            if let Err(e) = AuthManager::new().interactive_auth() {
                eprintln!("❌ Authentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deauth => {
            if let Err(e) = AuthManager::new().deauth() {
                eprintln!("❌ Deauthentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Set { key, value } => {
            let config_path = Config::get_config_path()?;
            let registry = SettingRegistry::new();
            let Some(key) = key else {
                let config = Config::load_from_path(&config_path)?;
                for line in describe(&registry, &config, &config_path) {
                    println!("{line}");
                }
                return Ok(());
            };
            match run_set(&registry, &config_path, &key, &value) {
                Ok(message) => println!("{message}"),
                Err(err) => {
                    err.print();
                    std::process::exit(err.exit_code());
                }
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let config_path = Config::get_config_path()?;
            match run_unset(&SettingRegistry::new(), &config_path, &key) {
                Ok(message) => println!("{message}"),
                Err(err) => {
                    err.print();
                    std::process::exit(err.exit_code());
                }
            }
            Ok(())
        }
        Commands::Chat => {
            let prepared = prepare(&args)?;
            let theme = if prepared.config.light_theme() {
                Theme::light()
            } else {
                Theme::dark_default()
            };
            let Some(client) = build_client(&prepared)? else {
                run_config_error(&missing_key_message(), theme).await?;
                std::process::exit(EXIT_MISSING_KEY);
            };

            let Prepared {
                config,
                config_path,
                preferences,
                store,
            } = prepared;
            let generator = Arc::new(GeminiGenerator::new(client.clone()));
            let app = App::new(AppInitConfig {
                config,
                config_path: Some(config_path),
                preferences,
                store,
                client,
            });
            run_chat(app, generator).await
        }
        Commands::Say { prompt } => {
            let prepared = prepare(&args)?;
            let Some(client) = build_client(&prepared)? else {
                eprintln!("{}", missing_key_message());
                std::process::exit(EXIT_MISSING_KEY);
            };
            say::run_say(&prompt.join(" "), client, &prepared.preferences).await
        }
        Commands::Devotional => {
            let prepared = prepare(&args)?;
            let Some(client) = build_client(&prepared)? else {
                eprintln!("{}", missing_key_message());
                std::process::exit(EXIT_MISSING_KEY);
            };
            let generator = GeminiGenerator::new(client);
            devotional::run_devotional(&generator, &prepared).await
        }
    }
}

/// Load config, apply flag overrides, start logging and open the data store.
fn prepare(args: &Args) -> Result<Prepared, Box<dyn Error>> {
    let config_path = Config::get_config_path()?;
    let config = Config::load_from_path(&config_path)?;
    let preferences = resolve_preferences(&config, args)?;
    let data_dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => config.resolve_data_dir()?,
    };

    match logging::init(&data_dir) {
        Ok(path) => info!(log = %path_display(&path), "logging initialized"),
        Err(err) => eprintln!("⚠️  Could not start logging: {err}"),
    }
    info!(
        version = %preferences.bible_version,
        language = %preferences.language,
        model = %preferences.model,
        data_dir = %path_display(&data_dir),
        "starting"
    );

    Ok(Prepared {
        config,
        config_path,
        preferences,
        store: LocalStore::new(data_dir),
    })
}

/// Config values overridden by flags. Unknown versions and languages are
/// rejected instead of silently falling back.
pub(crate) fn resolve_preferences(config: &Config, args: &Args) -> Result<Preferences, Box<dyn Error>> {
    if let Some(version) = args.bible_version.as_deref() {
        if find_bible_version(version).is_none() {
            let codes: Vec<&str> = BIBLE_VERSIONS.iter().map(|(code, _)| *code).collect();
            return Err(format!(
                "Unknown Bible version '{version}'. Choose one of: {}",
                codes.join(", ")
            )
            .into());
        }
    }
    if let Some(language) = args.language.as_deref() {
        if find_language(language).is_none() {
            return Err(format!("Unsupported language '{language}'").into());
        }
    }

    Ok(Preferences::from_config(config).with_overrides(
        args.bible_version.as_deref(),
        args.language.as_deref().and_then(find_language),
        args.model.as_deref(),
    ))
}

/// `None` when no API key is configured anywhere.
fn build_client(prepared: &Prepared) -> Result<Option<GeminiClient>, Box<dyn Error>> {
    let key = match AuthManager::new().resolve_api_key() {
        Ok(key) => key,
        Err(err) => {
            warn!("keyring lookup failed: {err}");
            return Err(Box::new(err));
        }
    };
    let Some(key) = key else {
        return Ok(None);
    };
    info!(source = ?key.source, "API key resolved");

    let http = reqwest::Client::builder().build()?;
    Ok(Some(GeminiClient::new(
        http,
        prepared.config.base_url(),
        key.key,
        prepared.preferences.model.clone(),
    )))
}
