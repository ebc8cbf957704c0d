use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

impl<'a> CommandInvocation<'a> {
    /// First whitespace-separated argument and the rest, trimmed.
    pub fn split_first(&self) -> (Option<&'a str>, &'a str) {
        let mut parts = self.args.splitn(2, char::is_whitespace);
        let first = parts.next().filter(|part| !part.is_empty());
        (first, parts.next().unwrap_or("").trim())
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

/// Commands whose name starts with `prefix`, for the input hint.
pub fn matching_commands(prefix: &str) -> impl Iterator<Item = &'static Command> + '_ {
    all_commands().iter().filter(move |command| {
        command
            .name
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show keys and commands.",
        handler: super::handle_help,
    },
    Command {
        name: "new",
        usage: "/new",
        help: "Start a new chat.",
        handler: super::handle_new,
    },
    Command {
        name: "select",
        usage: "/select <n>",
        help: "Switch to chat number n in the sidebar.",
        handler: super::handle_select,
    },
    Command {
        name: "delete",
        usage: "/delete [n]",
        help: "Delete chat n, or the current chat.",
        handler: super::handle_delete,
    },
    Command {
        name: "save",
        usage: "/save [#n] [note]",
        help: "Save reply n (default: the latest) to your study collection.",
        handler: super::handle_save,
    },
    Command {
        name: "ask",
        usage: "/ask <n>",
        help: "Ask starter question n from a new chat.",
        handler: super::handle_ask,
    },
    Command {
        name: "chat",
        usage: "/chat",
        help: "Show the chat view.",
        handler: super::handle_chat,
    },
    Command {
        name: "study",
        usage: "/study [open <n>|delete <n>]",
        help: "Show saved items, jump to an item's chat, or delete one.",
        handler: super::handle_study,
    },
    Command {
        name: "devotional",
        usage: "/devotional [new|delete <n>]",
        help: "Show devotionals, generate today's, or delete one.",
        handler: super::handle_devotional,
    },
    Command {
        name: "version",
        usage: "/version [v]",
        help: "Show or set the scripture version for new chats.",
        handler: super::handle_version,
    },
    Command {
        name: "language",
        usage: "/language [code]",
        help: "Show or set the response language for new chats.",
        handler: super::handle_language,
    },
    Command {
        name: "theme",
        usage: "/theme",
        help: "Switch between the dark and light palettes.",
        handler: super::handle_theme,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Exit.",
        handler: super::handle_quit,
    },
];
