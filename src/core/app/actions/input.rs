use tracing::debug;

use super::{apply_action, chat, devotional, sessions, study, App, AppAction, AppCommand};
use crate::commands::{process_input, CommandResult};
use crate::core::app::ui_state::{ConfirmAction, View};
use crate::core::constants::{find_bible_version, find_language, language_name};

pub(super) fn handle_input_action(app: &mut App, action: AppAction) -> Vec<AppCommand> {
    match action {
        AppAction::ProcessCommand { input } => return process_command(app, input),
        AppAction::ConfirmPending => confirm_pending(app),
        AppAction::CancelPending => {
            app.ui.confirmation = None;
        }
        AppAction::SwitchView { view } => app.ui.set_view(view),
        AppAction::CycleView { forward } => {
            let view = if forward {
                app.ui.view.next()
            } else {
                app.ui.view.previous()
            };
            app.ui.set_view(view);
        }
        AppAction::ScrollBy { lines } => app.ui.scroll_by(lines),
        AppAction::ToggleHelp => app.ui.show_help = !app.ui.show_help,
        AppAction::SetBibleVersion { version } => set_bible_version(app, &version),
        AppAction::SetLanguage { code } => set_language(app, &code),
        AppAction::ToggleTheme => toggle_theme(app),
        AppAction::Quit => app.ui.exit_requested = true,
        _ => unreachable!("non-input action routed to input handler"),
    }
    Vec::new()
}

fn process_command(app: &mut App, input: String) -> Vec<AppCommand> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    match process_input(app, &input) {
        CommandResult::Continue => Vec::new(),
        CommandResult::ProcessAsMessage(text) => {
            app.ui.set_view(View::Chat);
            chat::submit_message(app, text)
        }
        CommandResult::Action(action) => apply_action(app, action),
    }
}

fn confirm_pending(app: &mut App) {
    let Some(pending) = app.ui.confirmation.take() else {
        return;
    };
    debug!(action = ?pending.action, "confirmed");
    match pending.action {
        ConfirmAction::DeleteSession { id } => sessions::delete_session(app, &id),
        ConfirmAction::DeleteStudyItem { id } => study::delete_item(app, &id),
        ConfirmAction::DeleteDevotional { id } => devotional::delete_devotional(app, &id),
    }
}

/// Existing sessions keep their own version; new ones pick this up.
fn set_bible_version(app: &mut App, input: &str) {
    let Some(version) = find_bible_version(input) else {
        app.ui.error(format!("Unknown version: {}", input.trim()));
        return;
    };
    app.prefs.bible_version = version.to_string();
    app.config.bible_version = Some(version.to_string());
    app.ui.success(format!("Scripture version set to {version} for new chats"));
    app.save_config();
}

fn set_language(app: &mut App, input: &str) {
    let Some(code) = find_language(input) else {
        app.ui.error(format!("Unknown language: {}", input.trim()));
        return;
    };
    app.prefs.language = code.to_string();
    app.config.language = Some(code.to_string());
    app.ui.success(format!("Language set to {} for new chats", language_name(code)));
    app.save_config();
}

fn toggle_theme(app: &mut App) {
    app.ui.theme = app.ui.theme.toggled();
    app.config.theme = Some(app.ui.theme.name.to_string());
    app.save_config();
}
