mod chat;
mod devotional;
mod input;
mod sessions;
mod study;

use tokio::sync::mpsc;

use super::App;
use crate::core::app::ui_state::View;
use crate::core::chat_stream::StreamParams;
use crate::core::devotional::DevotionalContent;
use crate::core::study::Enrichment;

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    // Chat stream
    SubmitMessage {
        text: String,
    },
    AppendResponseChunk {
        content: String,
        stream_id: u64,
    },
    StreamErrored {
        message: String,
        stream_id: u64,
    },
    StreamCompleted {
        stream_id: u64,
    },
    TitleGenerated {
        session_id: String,
        title: Option<String>,
    },

    // Sessions
    NewChat,
    SelectSession {
        index: usize,
    },
    SelectRelativeSession {
        delta: isize,
    },
    /// `None` targets the active session.
    RequestDeleteSession {
        index: Option<usize>,
    },

    // Study collection
    /// `reply` is a 0-based position among the active session's replies;
    /// `None` saves the latest one.
    SaveReply {
        note: String,
        reply: Option<usize>,
    },
    EnrichmentCompleted {
        item_id: String,
        result: Result<Enrichment, String>,
    },
    OpenStudySession {
        index: usize,
    },
    RequestDeleteStudyItem {
        index: usize,
    },

    // Devotionals
    RequestDevotional,
    DevotionalGenerated {
        day_id: String,
        result: Result<DevotionalContent, String>,
    },
    RequestDeleteDevotional {
        index: usize,
    },

    // Input, navigation and preferences
    ProcessCommand {
        input: String,
    },
    ConfirmPending,
    CancelPending,
    SwitchView {
        view: View,
    },
    CycleView {
        forward: bool,
    },
    ScrollBy {
        lines: i32,
    },
    ToggleHelp,
    SetBibleVersion {
        version: String,
    },
    SetLanguage {
        code: String,
    },
    ToggleTheme,
    Quit,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppAction>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppAction>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction) {
        let _ = self.tx.send(action);
    }

    pub fn dispatch_many<I>(&self, actions: I)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions {
            self.dispatch(action);
        }
    }
}

/// Background work requested by an action. The event loop spawns these.
pub enum AppCommand {
    SpawnStream(StreamParams),
    GenerateTitle {
        session_id: String,
        first_message: String,
        language: String,
    },
    Enrich {
        item_id: String,
        content: String,
        bible_version: String,
        language: String,
    },
    GenerateDevotional {
        day_id: String,
        seed: String,
        language: String,
    },
}

pub fn apply_actions(app: &mut App, actions: impl IntoIterator<Item = AppAction>) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for action in actions {
        commands.extend(apply_action(app, action));
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction) -> Vec<AppCommand> {
    match action {
        AppAction::SubmitMessage { .. }
        | AppAction::AppendResponseChunk { .. }
        | AppAction::StreamErrored { .. }
        | AppAction::StreamCompleted { .. }
        | AppAction::TitleGenerated { .. } => chat::handle_chat_action(app, action),

        AppAction::NewChat
        | AppAction::SelectSession { .. }
        | AppAction::SelectRelativeSession { .. }
        | AppAction::RequestDeleteSession { .. } => sessions::handle_session_action(app, action),

        AppAction::SaveReply { .. }
        | AppAction::EnrichmentCompleted { .. }
        | AppAction::OpenStudySession { .. }
        | AppAction::RequestDeleteStudyItem { .. } => study::handle_study_action(app, action),

        AppAction::RequestDevotional
        | AppAction::DevotionalGenerated { .. }
        | AppAction::RequestDeleteDevotional { .. } => {
            devotional::handle_devotional_action(app, action)
        }

        AppAction::ProcessCommand { .. }
        | AppAction::ConfirmPending
        | AppAction::CancelPending
        | AppAction::SwitchView { .. }
        | AppAction::CycleView { .. }
        | AppAction::ScrollBy { .. }
        | AppAction::ToggleHelp
        | AppAction::SetBibleVersion { .. }
        | AppAction::SetLanguage { .. }
        | AppAction::ToggleTheme
        | AppAction::Quit => input::handle_input_action(app, action),
    }
}
