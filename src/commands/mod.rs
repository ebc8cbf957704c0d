mod registry;

pub use registry::{all_commands, matching_commands, Command, CommandInvocation};

use crate::core::app::{App, AppAction, View};
use crate::core::constants::{language_name, BIBLE_VERSIONS, LANGUAGES, STARTER_QUESTIONS};

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    Action(AppAction),
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match registry::find_command(command_name) {
        Some(command) => {
            let invocation = CommandInvocation {
                input: trimmed,
                args,
            };
            (command.handler)(app, invocation)
        }
        None => {
            app.ui.error(format!(
                "Unknown command: /{command_name}. Type /help for a list."
            ));
            CommandResult::Continue
        }
    }
}

/// Parse a 1-based list position typed by the user.
fn parse_position(app: &mut App, raw: Option<&str>, usage: &str) -> Option<usize> {
    match raw.map(str::parse::<usize>) {
        Some(Ok(n)) if n > 0 => Some(n - 1),
        _ => {
            app.ui.error(format!("Usage: {usage}"));
            None
        }
    }
}

fn action_or_continue(action: Option<AppAction>) -> CommandResult {
    action.map_or(CommandResult::Continue, CommandResult::Action)
}

pub(super) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.ui.show_help = true;
    CommandResult::Continue
}

pub(super) fn handle_new(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Action(AppAction::NewChat)
}

pub(super) fn handle_select(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let (raw, _) = invocation.split_first();
    action_or_continue(
        parse_position(app, raw, "/select <n>").map(|index| AppAction::SelectSession { index }),
    )
}

pub(super) fn handle_delete(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let (raw, _) = invocation.split_first();
    if raw.is_none() {
        return CommandResult::Action(AppAction::RequestDeleteSession { index: None });
    }
    action_or_continue(
        parse_position(app, raw, "/delete [n]")
            .map(|index| AppAction::RequestDeleteSession { index: Some(index) }),
    )
}

/// `/save [#n] [note]`: a leading `#n` picks the n-th reply in the chat.
pub(super) fn handle_save(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let (first, rest) = invocation.split_first();
    let Some(position) = first.and_then(|token| token.strip_prefix('#')) else {
        return CommandResult::Action(AppAction::SaveReply {
            note: invocation.args.to_string(),
            reply: None,
        });
    };
    action_or_continue(
        parse_position(app, Some(position), "/save [#n] [note]").map(|index| {
            AppAction::SaveReply {
                note: rest.to_string(),
                reply: Some(index),
            }
        }),
    )
}

pub(super) fn handle_ask(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let usage = format!("/ask <1-{}>", STARTER_QUESTIONS.len());
    let (raw, _) = invocation.split_first();
    let Some(index) = parse_position(app, raw, &usage) else {
        return CommandResult::Continue;
    };
    match STARTER_QUESTIONS.get(index) {
        Some(question) => CommandResult::ProcessAsMessage((*question).to_string()),
        None => {
            app.ui.error(format!("Usage: {usage}"));
            CommandResult::Continue
        }
    }
}

pub(super) fn handle_chat(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Action(AppAction::SwitchView { view: View::Chat })
}

pub(super) fn handle_study(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    const USAGE: &str = "/study [open <n>|delete <n>]";
    let (sub, rest) = invocation.split_first();
    let position = (!rest.is_empty()).then_some(rest);
    match sub.map(str::to_ascii_lowercase).as_deref() {
        None => CommandResult::Action(AppAction::SwitchView { view: View::Study }),
        Some("open") => action_or_continue(
            parse_position(app, position, USAGE).map(|index| AppAction::OpenStudySession { index }),
        ),
        Some("delete") => action_or_continue(
            parse_position(app, position, USAGE)
                .map(|index| AppAction::RequestDeleteStudyItem { index }),
        ),
        Some(_) => {
            app.ui.error(format!("Usage: {USAGE}"));
            CommandResult::Continue
        }
    }
}

pub(super) fn handle_devotional(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    const USAGE: &str = "/devotional [new|delete <n>]";
    let (sub, rest) = invocation.split_first();
    let position = (!rest.is_empty()).then_some(rest);
    match sub.map(str::to_ascii_lowercase).as_deref() {
        None => CommandResult::Action(AppAction::SwitchView {
            view: View::Devotional,
        }),
        Some("new") => CommandResult::Action(AppAction::RequestDevotional),
        Some("delete") => action_or_continue(
            parse_position(app, position, USAGE)
                .map(|index| AppAction::RequestDeleteDevotional { index }),
        ),
        Some(_) => {
            app.ui.error(format!("Usage: {USAGE}"));
            CommandResult::Continue
        }
    }
}

pub(super) fn handle_version(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        let available: Vec<&str> = BIBLE_VERSIONS.iter().map(|(code, _)| *code).collect();
        app.ui.info(format!(
            "Version: {} (available: {})",
            app.prefs.bible_version,
            available.join(", ")
        ));
        return CommandResult::Continue;
    }
    CommandResult::Action(AppAction::SetBibleVersion {
        version: invocation.args.to_string(),
    })
}

pub(super) fn handle_language(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        let available: Vec<&str> = LANGUAGES.iter().map(|(code, _)| *code).collect();
        app.ui.info(format!(
            "Language: {} (available: {})",
            language_name(&app.prefs.language),
            available.join(", ")
        ));
        return CommandResult::Continue;
    }
    CommandResult::Action(AppAction::SetLanguage {
        code: invocation.args.to_string(),
    })
}

pub(super) fn handle_theme(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Action(AppAction::ToggleTheme)
}

pub(super) fn handle_quit(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Action(AppAction::Quit)
}

#[cfg(test)]
mod tests;
