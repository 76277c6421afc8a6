use super::CommandResult;
use crate::core::session::ConversationSession;

pub type CommandHandler = fn(&mut ConversationSession, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "clear",
        usage: "/clear",
        help: "Clear the conversation history.",
        handler: super::handle_clear,
    },
    Command {
        name: "model",
        usage: "/model [id]",
        help: "Show the current model or switch to another one.",
        handler: super::handle_model,
    },
    Command {
        name: "models",
        usage: "/models",
        help: "List the selectable models.",
        handler: super::handle_models,
    },
    Command {
        name: "history",
        usage: "/history",
        help: "Show the conversation so far.",
        handler: super::handle_history,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];
