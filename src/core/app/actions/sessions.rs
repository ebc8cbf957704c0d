use tracing::info;

use super::{App, AppAction, AppCommand};
use crate::core::app::ui_state::{ConfirmAction, View};

pub(super) fn handle_session_action(app: &mut App, action: AppAction) -> Vec<AppCommand> {
    match action {
        AppAction::NewChat => {
            app.start_new_session();
            app.ui.set_view(View::Chat);
        }
        AppAction::SelectSession { index } => select_session(app, index),
        AppAction::SelectRelativeSession { delta } => {
            if app.sessions.select_relative(delta) {
                after_selection(app);
            }
        }
        AppAction::RequestDeleteSession { index } => request_delete(app, index),
        _ => unreachable!("non-session action routed to session handler"),
    }
    Vec::new()
}

fn select_session(app: &mut App, index: usize) {
    let Some(id) = app.sessions.sessions().get(index).map(|s| s.id.clone()) else {
        app.ui.error(format!("No chat #{}", index + 1));
        return;
    };
    if app.sessions.select(&id) {
        after_selection(app);
        app.ui.set_view(View::Chat);
    }
}

fn after_selection(app: &mut App) {
    app.chat.error = None;
    app.ui.scroll_offset = 0;
}

fn request_delete(app: &mut App, index: Option<usize>) {
    let target = match index {
        Some(index) => app.sessions.sessions().get(index),
        None => app.sessions.active(),
    };
    let Some(session) = target else {
        app.ui.error("No such chat");
        return;
    };
    let prompt = format!("Delete chat \"{}\"? (y/n)", session.title);
    let id = session.id.clone();
    app.ui.request_confirmation(prompt, ConfirmAction::DeleteSession { id });
}

/// Remove a session. Losing the last one leaves a fresh default session.
pub(in crate::core::app) fn delete_session(app: &mut App, id: &str) {
    let Some(removed) = app.sessions.remove(id) else {
        return;
    };
    info!(session = %removed.session.id, "deleted chat session");

    if app.sessions.is_empty() {
        app.start_new_session();
    } else {
        if removed.was_active {
            after_selection(app);
        }
        app.persist_sessions();
    }
    app.ui.success("Chat deleted");
}
