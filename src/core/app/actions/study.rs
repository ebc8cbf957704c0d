use tracing::{info, warn};

use super::{App, AppAction, AppCommand};
use crate::core::app::ui_state::{ConfirmAction, View};
use crate::core::study::{Enrichment, SavedItem};

pub(super) fn handle_study_action(app: &mut App, action: AppAction) -> Vec<AppCommand> {
    match action {
        AppAction::SaveReply { note, reply } => save_reply(app, note, reply).into_iter().collect(),
        AppAction::EnrichmentCompleted { item_id, result } => {
            finish_enrichment(app, &item_id, result);
            Vec::new()
        }
        AppAction::OpenStudySession { index } => {
            open_session(app, index);
            Vec::new()
        }
        AppAction::RequestDeleteStudyItem { index } => {
            request_delete(app, index);
            Vec::new()
        }
        _ => unreachable!("non-study action routed to study handler"),
    }
}

/// Snapshot one of the active session's replies (the latest by default)
/// into the collection and ask for enrichment.
fn save_reply(app: &mut App, note: String, reply: Option<usize>) -> Option<AppCommand> {
    let session = app.sessions.active()?;
    let streaming_id = app
        .chat
        .active_stream
        .as_ref()
        .filter(|stream| stream.session_id == session.id)
        .map(|stream| stream.message_id.as_str());

    let message = match reply {
        None if streaming_id.is_some() => {
            app.ui.info("Wait for the reply to finish before saving it");
            return None;
        }
        None => match session.last_model_reply() {
            Some(message) => message.clone(),
            None => {
                app.ui.error("There is no reply to save yet");
                return None;
            }
        },
        Some(index) => match session.model_replies().nth(index) {
            Some(message) if streaming_id == Some(message.id.as_str()) => {
                app.ui.info("Wait for the reply to finish before saving it");
                return None;
            }
            Some(message) => message.clone(),
            None => {
                app.ui.error(format!("No reply #{}", index + 1));
                return None;
            }
        },
    };

    let session_id = session.id.clone();
    let session_title = session.title.clone();
    let bible_version = session.bible_version.clone();
    let language = session.language.clone();

    let saved_at = app.ids.next_millis();
    let item = SavedItem {
        id: format!("study-{saved_at}"),
        message,
        note: note.trim().to_string(),
        saved_at,
        session_id,
        session_title,
        is_enriching: Some(true),
        keywords: None,
        ai_reflection: None,
        cross_references: None,
    };
    let command = AppCommand::Enrich {
        item_id: item.id.clone(),
        content: item.message.content.clone(),
        bible_version,
        language,
    };
    info!(item = %item.id, "saved reply to study collection");

    app.study.prepend(item);
    app.persist_study();
    app.ui.info("Saved to study. Enriching...");
    Some(command)
}

fn finish_enrichment(app: &mut App, item_id: &str, result: Result<Enrichment, String>) {
    match result {
        Ok(enrichment) => {
            if app.study.complete_enrichment(item_id, enrichment) {
                app.ui.success("Item saved and enriched");
            }
        }
        Err(message) => {
            warn!(item = %item_id, "enrichment failed: {message}");
            if app.study.fail_enrichment(item_id) {
                app.ui.error(format!("Item saved. Enrichment failed: {message}"));
            }
        }
    }
    app.persist_study();
}

/// Jump back to the chat an item was saved from.
fn open_session(app: &mut App, index: usize) {
    let Some(item) = app.study.items().get(index) else {
        app.ui.error(format!("No study item #{}", index + 1));
        return;
    };
    let session_id = item.session_id.clone();
    if app.sessions.select(&session_id) {
        app.chat.error = None;
        app.ui.set_view(View::Chat);
        app.ui.scroll_offset = 0;
    } else {
        app.ui.error("The chat this item came from has been deleted");
    }
}

fn request_delete(app: &mut App, index: usize) {
    let Some(item) = app.study.items().get(index) else {
        app.ui.error(format!("No study item #{}", index + 1));
        return;
    };
    let id = item.id.clone();
    app.ui.request_confirmation(
        format!("Delete study item #{}? (y/n)", index + 1),
        ConfirmAction::DeleteStudyItem { id },
    );
}

pub(in crate::core::app) fn delete_item(app: &mut App, id: &str) {
    if app.study.remove(id).is_some() {
        app.persist_study();
        app.ui.success("Study item deleted");
    }
}
