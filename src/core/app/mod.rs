use std::path::PathBuf;
use std::time::Instant;

use tracing::{error, info};

use crate::api::client::GeminiClient;
use crate::core::config::Config;
use crate::core::constants::find_bible_version;
use crate::core::devotional::DevotionalStore;
use crate::core::ids::IdGenerator;
use crate::core::session::{ChatSession, SessionStore};
use crate::core::storage::LocalStore;
use crate::core::study::StudyCollection;
use crate::ui::theme::Theme;

pub mod actions;
pub mod ui_state;


pub use actions::{apply_action, apply_actions, AppAction, AppActionDispatcher, AppCommand};
pub use ui_state::{NotificationKind, UiState, View};

/// Effective settings for this run: the config file plus CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub bible_version: String,
    pub language: String,
    pub model: String,
}

impl Preferences {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bible_version: config.bible_version().to_string(),
            language: config.language().to_string(),
            model: config.model().to_string(),
        }
    }

    /// Apply `--bible-version`, `--language` and `--model` for this run.
    pub fn with_overrides(
        mut self,
        bible_version: Option<&str>,
        language: Option<&str>,
        model: Option<&str>,
    ) -> Self {
        if let Some(version) = bible_version.and_then(find_bible_version) {
            self.bible_version = version.to_string();
        }
        if let Some(language) = language.map(str::trim).filter(|l| !l.is_empty()) {
            self.language = language.to_ascii_lowercase();
        }
        if let Some(model) = model.map(str::trim).filter(|m| !m.is_empty()) {
            self.model = model.to_string();
        }
        self
    }
}

/// The chat reply currently being streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveStream {
    pub stream_id: u64,
    pub session_id: String,
    pub message_id: String,
    /// Fragments as received, before newline normalization.
    pub raw: String,
    pub started_at: Instant,
}

#[derive(Debug, Default)]
pub struct ChatState {
    pub active_stream: Option<ActiveStream>,
    pub last_stream_id: u64,
    /// Shown under the transcript until the next send.
    pub error: Option<String>,
    pub devotional_in_flight: bool,
}

impl ChatState {
    pub fn next_stream_id(&mut self) -> u64 {
        self.last_stream_id += 1;
        self.last_stream_id
    }
}

pub struct AppInitConfig {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub preferences: Preferences,
    pub store: LocalStore,
    pub client: GeminiClient,
}

pub struct App {
    pub sessions: SessionStore,
    pub study: StudyCollection,
    pub devotionals: DevotionalStore,
    pub store: LocalStore,
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub prefs: Preferences,
    pub client: GeminiClient,
    pub ids: IdGenerator,
    pub user_id: String,
    pub chat: ChatState,
    pub ui: UiState,
}

impl App {
    pub fn new(init: AppInitConfig) -> Self {
        let AppInitConfig {
            config,
            config_path,
            preferences,
            store,
            client,
        } = init;

        let theme = if config.light_theme() {
            Theme::light()
        } else {
            Theme::dark_default()
        };

        let mut app = App {
            sessions: SessionStore::load(&store),
            study: StudyCollection::load(&store),
            devotionals: DevotionalStore::load(&store),
            user_id: store.user_id(),
            store,
            config,
            config_path,
            prefs: preferences,
            client,
            ids: IdGenerator::new(),
            chat: ChatState::default(),
            ui: UiState::new(theme),
        };

        info!(
            sessions = app.sessions.len(),
            study = app.study.len(),
            devotionals = app.devotionals.len(),
            "loaded local data"
        );

        if app.sessions.is_empty() {
            app.start_new_session();
        }
        app
    }

    /// Create a session with the current preferences and make it active.
    pub fn start_new_session(&mut self) -> String {
        let created_at = self.ids.next_millis();
        let id = created_at.to_string();
        let session = ChatSession::new(
            id.clone(),
            created_at,
            self.prefs.bible_version.clone(),
            self.prefs.language.clone(),
        );
        self.sessions.insert_front(session);
        self.chat.error = None;
        self.ui.scroll_offset = 0;
        self.persist_sessions();
        id
    }

    pub fn is_streaming(&self) -> bool {
        self.chat.active_stream.is_some()
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        self.sessions.active()
    }

    pub fn persist_sessions(&self) {
        self.sessions.save(&self.store);
    }

    pub fn persist_study(&self) {
        self.study.save(&self.store);
    }

    pub fn persist_devotionals(&self) {
        self.devotionals.save(&self.store);
    }

    /// Write preference changes back to the config file, if there is one.
    pub fn save_config(&mut self) {
        let Some(path) = self.config_path.clone() else {
            return;
        };
        if let Err(err) = self.config.save_to_path(&path) {
            error!("failed to save config: {err}");
            self.ui.error(format!("Could not save settings: {err}"));
        }
    }

    #[cfg(test)]
    pub fn new_test_app(dir: &std::path::Path) -> Self {
        let config = Config::default();
        let preferences = Preferences::from_config(&config);
        App::new(AppInitConfig {
            preferences,
            config,
            config_path: Some(dir.join("config.toml")),
            store: LocalStore::new(dir.join("data")),
            client: GeminiClient::new(
                reqwest::Client::new(),
                "http://127.0.0.1:9/v1beta",
                "test-key",
                "gemini-test",
            ),
        })
    }
}
