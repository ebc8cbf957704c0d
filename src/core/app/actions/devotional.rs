use chrono::Local;
use tracing::{info, warn};

use super::{App, AppAction, AppCommand};
use crate::core::app::ui_state::{ConfirmAction, View};
use crate::core::devotional::{daily_seed, today_id, Devotional, DevotionalContent};

pub(super) fn handle_devotional_action(app: &mut App, action: AppAction) -> Vec<AppCommand> {
    match action {
        AppAction::RequestDevotional => request_devotional(app, &today_id()).into_iter().collect(),
        AppAction::DevotionalGenerated { day_id, result } => {
            store_devotional(app, day_id, result);
            Vec::new()
        }
        AppAction::RequestDeleteDevotional { index } => {
            request_delete(app, index);
            Vec::new()
        }
        _ => unreachable!("non-devotional action routed to devotional handler"),
    }
}

/// At most one devotional per day, and one request at a time.
fn request_devotional(app: &mut App, day_id: &str) -> Option<AppCommand> {
    app.ui.set_view(View::Devotional);
    if app.devotionals.for_day(day_id).is_some() {
        app.ui.info("Today's devotional is already here. Come back tomorrow!");
        return None;
    }
    if app.chat.devotional_in_flight {
        app.ui.info("Today's devotional is already being prepared");
        return None;
    }

    app.chat.devotional_in_flight = true;
    app.ui.info("Preparing today's devotional...");
    Some(AppCommand::GenerateDevotional {
        day_id: day_id.to_string(),
        seed: daily_seed(&app.user_id, day_id),
        language: app.prefs.language.clone(),
    })
}

fn store_devotional(app: &mut App, day_id: String, result: Result<DevotionalContent, String>) {
    app.chat.devotional_in_flight = false;
    let content = match result {
        Ok(content) => content,
        Err(message) => {
            warn!(day = %day_id, "devotional generation failed: {message}");
            app.ui.error(format!("Could not generate devotional: {message}"));
            return;
        }
    };

    let now = Local::now();
    let id = app.ids.next_prefixed("devo");
    let devotional = Devotional::from_content(id, day_id, now.to_rfc3339(), content);
    match app.devotionals.insert(devotional) {
        Ok(()) => {
            info!("stored today's devotional");
            app.persist_devotionals();
            app.ui.success("Today's devotional is ready");
        }
        Err(duplicate) => {
            warn!(day = %duplicate.day_id, "discarding second devotional for the same day");
        }
    }
}

fn request_delete(app: &mut App, index: usize) {
    let Some(devotional) = app.devotionals.devotionals().get(index) else {
        app.ui.error(format!("No devotional #{}", index + 1));
        return;
    };
    let id = devotional.id.clone();
    let prompt = format!("Delete the devotional for {}? (y/n)", devotional.day_id);
    app.ui.request_confirmation(prompt, ConfirmAction::DeleteDevotional { id });
}

pub(in crate::core::app) fn delete_devotional(app: &mut App, id: &str) {
    if app.devotionals.remove(id).is_some() {
        app.persist_devotionals();
        app.ui.success("Devotional deleted");
    }
}
