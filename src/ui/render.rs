//! Plain-text rendering of transcript messages.
//!
//! Rendering produces [`RenderedLine`]s tagged with a [`Tone`]; colour is
//! applied only when the lines are written to a terminal.

use std::io::{self, Write};

use ratatui::crossterm::style::{Attribute, Color, Stylize};

use crate::core::message::{Message, Role};

pub const USER_LABEL: &str = "You:";
pub const TOOL_LABEL: &str = "🛠️ Tool Response:";
pub const EVALUATION_HEADER: &str = "📊 Evaluation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    User,
    Assistant,
    Tool,
    Evaluation,
    Notice,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub tone: Tone,
    pub text: String,
}

impl RenderedLine {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(Tone::Notice, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Tone::Error, text)
    }
}

/// Render one message. Assistant messages without content (tool-call
/// carriers) and system messages produce nothing. The evaluation is not
/// included; see [`render_evaluation`].
pub fn render_message(message: &Message) -> Vec<RenderedLine> {
    match message.role {
        Role::User => {
            let mut lines = Vec::new();
            let mut content = message.content_str().lines();
            let first = content.next().unwrap_or_default();
            lines.push(RenderedLine::new(Tone::User, format!("{USER_LABEL} {first}")));
            lines.extend(content.map(|line| RenderedLine::new(Tone::User, format!("     {line}"))));
            lines
        }
        Role::Assistant if message.has_content() => message
            .content_str()
            .lines()
            .map(|line| RenderedLine::new(Tone::Assistant, line))
            .collect(),
        Role::Tool => render_tool_result(message),
        Role::Assistant | Role::System => Vec::new(),
    }
}

/// A tool result as a labelled JSON block. Content that is not JSON is
/// shown verbatim inside the block.
pub fn render_tool_result(message: &Message) -> Vec<RenderedLine> {
    let name = message.name.as_deref().unwrap_or("unknown");
    let content = message.content_str();
    let body = serde_json::from_str::<serde_json::Value>(content)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| content.to_string());

    let mut lines = vec![
        RenderedLine::new(Tone::Tool, format!("{TOOL_LABEL} {name}")),
        RenderedLine::new(Tone::Tool, "```json"),
    ];
    lines.extend(body.lines().map(|line| RenderedLine::new(Tone::Tool, line)));
    lines.push(RenderedLine::new(Tone::Tool, "```"));
    lines
}

pub fn render_evaluation(evaluation: &str) -> Vec<RenderedLine> {
    let mut lines = vec![RenderedLine::new(Tone::Evaluation, EVALUATION_HEADER)];
    lines.extend(
        evaluation
            .lines()
            .map(|line| RenderedLine::new(Tone::Evaluation, format!("│ {line}"))),
    );
    lines
}

/// Render a whole transcript. Only the latest assistant reply carries its
/// evaluation panel.
pub fn render_transcript(messages: &[Message]) -> Vec<RenderedLine> {
    let latest_reply = messages
        .iter()
        .rposition(|message| message.is_assistant() && message.has_content());

    let mut lines = Vec::new();
    for (index, message) in messages.iter().enumerate() {
        let rendered = render_message(message);
        if rendered.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(RenderedLine::new(Tone::Notice, ""));
        }
        lines.extend(rendered);
        if Some(index) == latest_reply {
            if let Some(evaluation) = message.evaluation.as_deref() {
                lines.push(RenderedLine::new(Tone::Notice, ""));
                lines.extend(render_evaluation(evaluation));
            }
        }
    }
    lines
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::User => Color::Cyan,
        Tone::Assistant => Color::Reset,
        Tone::Tool => Color::Yellow,
        Tone::Evaluation => Color::Magenta,
        Tone::Notice => Color::DarkGrey,
        Tone::Error => Color::Red,
    }
}

pub fn write_lines<W: Write>(out: &mut W, lines: &[RenderedLine], color: bool) -> io::Result<()> {
    for line in lines {
        if color && !line.text.is_empty() {
            let styled = line.text.as_str().with(tone_color(line.tone));
            let styled = match line.tone {
                Tone::User | Tone::Error => styled.attribute(Attribute::Bold),
                _ => styled,
            };
            writeln!(out, "{styled}")?;
        } else {
            writeln!(out, "{}", line.text)?;
        }
    }
    out.flush()
}
