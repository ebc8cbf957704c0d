use std::time::Instant;

use tracing::{debug, warn};

use super::{App, AppAction, AppCommand};
use crate::api::Content;
use crate::core::app::ActiveStream;
use crate::core::chat_stream::{chat_request, StreamParams};
use crate::core::constants::NEW_CHAT_TITLE;
use crate::core::message::ChatMessage;
use crate::core::text::push_collapsed;

pub(super) fn handle_chat_action(app: &mut App, action: AppAction) -> Vec<AppCommand> {
    match action {
        AppAction::SubmitMessage { text } => submit_message(app, text),
        AppAction::AppendResponseChunk { content, stream_id } => {
            if is_current_stream(app, stream_id) {
                append_response_chunk(app, &content);
            }
            Vec::new()
        }
        AppAction::StreamErrored { message, stream_id } => {
            if is_current_stream(app, stream_id) {
                handle_stream_error(app, message);
            }
            Vec::new()
        }
        AppAction::StreamCompleted { stream_id } => {
            if is_current_stream(app, stream_id) {
                finalize_stream(app);
            }
            Vec::new()
        }
        AppAction::TitleGenerated { session_id, title } => {
            apply_title(app, &session_id, title);
            Vec::new()
        }
        _ => unreachable!("non-chat action routed to chat handler"),
    }
}

fn is_current_stream(app: &App, stream_id: u64) -> bool {
    app.chat
        .active_stream
        .as_ref()
        .is_some_and(|stream| stream.stream_id == stream_id)
}

/// Append the user's text and an empty model reply to the active session,
/// then ask for the stream (and a title, for a session's first question).
pub(in crate::core::app) fn submit_message(app: &mut App, text: String) -> Vec<AppCommand> {
    let text = text.trim();
    if text.is_empty() || app.is_streaming() {
        return Vec::new();
    }
    let Some(session) = app.sessions.active() else {
        return Vec::new();
    };

    let is_first_question = !session.has_user_messages();
    let session_id = session.id.clone();
    let bible_version = session.bible_version.clone();
    let language = session.language.clone();

    let mut contents: Vec<Content> = session
        .conversation_history()
        .map(|message| Content::text(message.role.as_str(), message.content.clone()))
        .collect();
    contents.push(Content::text("user", text));

    let user_id = app.ids.next_id();
    let model_id = app.ids.next_id();
    if let Some(session) = app.sessions.get_mut(&session_id) {
        session.push(ChatMessage::user(user_id, text));
        session.push(ChatMessage::model(model_id.clone(), ""));
    }

    let stream_id = app.chat.next_stream_id();
    app.chat.active_stream = Some(ActiveStream {
        stream_id,
        session_id: session_id.clone(),
        message_id: model_id,
        raw: String::new(),
        started_at: Instant::now(),
    });
    app.chat.error = None;
    app.ui.scroll_offset = 0;
    app.persist_sessions();

    debug!(stream_id, session = %session_id, turns = contents.len(), "starting chat stream");

    let request = chat_request(contents, &bible_version, &language);

    let mut commands = vec![AppCommand::SpawnStream(StreamParams {
        client: app.client.clone(),
        request,
        stream_id,
    })];
    if is_first_question {
        commands.push(AppCommand::GenerateTitle {
            session_id,
            first_message: text.to_string(),
            language,
        });
    }
    commands
}

fn append_response_chunk(app: &mut App, chunk: &str) {
    if chunk.is_empty() {
        return;
    }
    let Some(stream) = app.chat.active_stream.as_mut() else {
        return;
    };
    stream.raw.push_str(chunk);
    let (session_id, message_id) = (stream.session_id.clone(), stream.message_id.clone());

    if let Some(message) = app
        .sessions
        .get_mut(&session_id)
        .and_then(|session| session.message_mut(&message_id))
    {
        push_collapsed(&mut message.content, chunk);
    }
}

fn handle_stream_error(app: &mut App, message: String) {
    let Some(stream) = app.chat.active_stream.take() else {
        return;
    };
    warn!(stream_id = stream.stream_id, "chat stream failed: {message}");
    if let Some(session) = app.sessions.get_mut(&stream.session_id) {
        session.remove_message(&stream.message_id);
    }
    app.chat.error = Some(format!("Error: {message}"));
    app.persist_sessions();
}

fn finalize_stream(app: &mut App) {
    let Some(stream) = app.chat.active_stream.take() else {
        return;
    };
    debug!(stream_id = stream.stream_id, bytes = stream.raw.len(), "chat stream finished");
    app.persist_sessions();
}

fn apply_title(app: &mut App, session_id: &str, title: Option<String>) {
    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NEW_CHAT_TITLE.to_string());
    if app.sessions.set_title(session_id, title) {
        app.persist_sessions();
    }
}
