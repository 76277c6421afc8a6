//! Slash commands available in the chat REPL.

mod registry;

pub use registry::{all_commands, CommandInvocation};

use crate::core::constants::{is_known_model, AVAILABLE_MODELS};
use crate::core::session::ConversationSession;
use crate::ui::render::RenderedLine;

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    Show(Vec<RenderedLine>),
    ShowHistory,
    Quit,
}

/// Run `input` as a slash command, or hand it back as a chat message.
/// Unrecognised `/words` are sent to the model unchanged.
pub fn process_input(session: &mut ConversationSession, input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match registry::find_command(command_name) {
        Some(command) => {
            (command.handler)(session, CommandInvocation { args })
        }
        None => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

pub fn help_lines() -> Vec<RenderedLine> {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or(0);
    let mut lines = vec![RenderedLine::notice("Commands:")];
    lines.extend(all_commands().iter().map(|command| {
        RenderedLine::notice(format!("  {:width$}  {}", command.usage, command.help))
    }));
    lines.push(RenderedLine::notice(
        "Anything else is sent to the assistant. Ctrl+D also quits.",
    ));
    lines
}

pub fn model_list_lines(current: &str) -> Vec<RenderedLine> {
    AVAILABLE_MODELS
        .iter()
        .map(|model| {
            let marker = if *model == current { "*" } else { " " };
            RenderedLine::notice(format!("{marker} {model}"))
        })
        .collect()
}

pub(super) fn handle_help(
    _session: &mut ConversationSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Show(help_lines())
}

pub(super) fn handle_clear(
    session: &mut ConversationSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    session.clear();
    CommandResult::Show(vec![RenderedLine::notice("History cleared")])
}

pub(super) fn handle_model(
    session: &mut ConversationSession,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    if invocation.args.is_empty() {
        let mut lines = vec![RenderedLine::notice(format!(
            "Current model: {}",
            session.model()
        ))];
        lines.extend(model_list_lines(session.model()));
        return CommandResult::Show(lines);
    }

    let model_id = invocation.args;
    if !is_known_model(model_id) {
        return CommandResult::Show(vec![
            RenderedLine::error(format!("Unknown model: {model_id}")),
            RenderedLine::notice(format!("Available: {}", AVAILABLE_MODELS.join(", "))),
        ]);
    }

    session.set_model(model_id);
    CommandResult::Show(vec![RenderedLine::notice(format!("Model set: {model_id}"))])
}

pub(super) fn handle_models(
    session: &mut ConversationSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Show(model_list_lines(session.model()))
}

pub(super) fn handle_history(
    _session: &mut ConversationSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::ShowHistory
}

pub(super) fn handle_quit(
    _session: &mut ConversationSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Quit
}
