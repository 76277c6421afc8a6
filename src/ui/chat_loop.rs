//! Line-oriented chat REPL.

use std::error::Error;
use std::io::{self, IsTerminal, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::commands::{process_input, CommandResult};
use crate::core::message::Message;
use crate::core::session::ConversationSession;
use crate::core::turn::{TurnError, TurnObserver, TurnRunner, TurnState};
use crate::ui::render::{
    render_evaluation, render_message, render_tool_result, render_transcript, write_lines,
    RenderedLine,
};

const INPUT_PROMPT: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Prints turn progress as it happens. Write failures are kept and
/// reported once the turn is over.
struct ConsoleObserver<'a, W: Write> {
    out: &'a mut W,
    color: bool,
    error: Option<io::Error>,
}

impl<'a, W: Write> ConsoleObserver<'a, W> {
    fn new(out: &'a mut W, color: bool) -> Self {
        Self {
            out,
            color,
            error: None,
        }
    }

    fn emit(&mut self, lines: &[RenderedLine]) {
        if self.error.is_some() || lines.is_empty() {
            return;
        }
        if let Err(err) = write_lines(&mut *self.out, lines, self.color) {
            self.error = Some(err);
        }
    }

    fn finish(self) -> io::Result<()> {
        self.error.map_or(Ok(()), Err)
    }
}

impl<W: Write> TurnObserver for ConsoleObserver<'_, W> {
    fn on_state(&mut self, state: TurnState) {
        match state {
            TurnState::AwaitingFirstCompletion
            | TurnState::AwaitingToolResults
            | TurnState::AwaitingSecondCompletion
            | TurnState::AwaitingEvaluation => {
                self.emit(&[RenderedLine::notice(format!("⏳ {state}"))]);
            }
            _ => debug!(state = %state, "Turn state"),
        }
    }

    fn on_tool_result(&mut self, message: &Message) {
        self.emit(&render_tool_result(message));
    }

    fn on_reply(&mut self, message: &Message) {
        let mut lines = vec![RenderedLine::notice("")];
        lines.extend(render_message(message));
        self.emit(&lines);
    }
}

pub fn error_lines(err: &TurnError) -> Vec<RenderedLine> {
    let text = match err {
        TurnError::EmptyPrompt => return vec![RenderedLine::notice(format!("⚠️  {err}"))],
        TurnError::EmptyReply => format!("⚠️  {err}. Nothing was added to the history."),
        TurnError::Api(_) => format!("❌ {err}"),
    };
    text.lines().map(RenderedLine::error).collect()
}

pub struct ChatLoop {
    runner: TurnRunner,
    session: ConversationSession,
    color: bool,
}

impl ChatLoop {
    pub fn new(runner: TurnRunner, session: ConversationSession, color: bool) -> Self {
        Self {
            runner,
            session,
            color,
        }
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn banner(&self) -> Vec<RenderedLine> {
        vec![
            RenderedLine::notice(format!(
                "🤖 Coding assistant ready (model: {}, evaluation: {})",
                self.session.model(),
                self.runner.evaluation_model()
            )),
            RenderedLine::notice("Type /help for commands, /quit to leave."),
        ]
    }

    /// Handle one line of user input: a slash command or a chat turn.
    pub async fn handle_input<W: Write>(
        &mut self,
        input: &str,
        out: &mut W,
    ) -> io::Result<LoopControl> {
        if input.trim().is_empty() {
            return Ok(LoopControl::Continue);
        }

        match process_input(&mut self.session, input) {
            CommandResult::Continue => {}
            CommandResult::Show(lines) => write_lines(out, &lines, self.color)?,
            CommandResult::ShowHistory => {
                let lines = render_transcript(self.session.messages());
                if lines.is_empty() {
                    write_lines(out, &[RenderedLine::notice("No messages yet")], self.color)?;
                } else {
                    write_lines(out, &lines, self.color)?;
                }
            }
            CommandResult::Quit => return Ok(LoopControl::Quit),
            CommandResult::ProcessAsMessage(prompt) => self.run_turn(&prompt, out).await?,
        }
        Ok(LoopControl::Continue)
    }

    async fn run_turn<W: Write>(&mut self, prompt: &str, out: &mut W) -> io::Result<()> {
        let mut observer = ConsoleObserver::new(&mut *out, self.color);
        let result = self
            .runner
            .run(&mut self.session, prompt, &mut observer)
            .await;
        observer.finish()?;

        let mut lines = Vec::new();
        match result {
            Ok(outcome) => {
                if let Some(evaluation) = outcome.reply.evaluation.as_deref() {
                    lines.push(RenderedLine::notice(""));
                    lines.extend(render_evaluation(evaluation));
                }
            }
            Err(err) => lines.extend(error_lines(&err)),
        }
        lines.push(RenderedLine::notice(""));
        write_lines(out, &lines, self.color)
    }
}

/// Run the REPL on stdin/stdout until `/quit` or end of input.
pub async fn run_chat(mut chat: ChatLoop) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout();
    write_lines(&mut stdout, &chat.banner(), chat.color)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(stdout, "{INPUT_PROMPT}")?;
        stdout.flush()?;

        let Some(input) = lines.next_line().await? else {
            writeln!(stdout)?;
            break;
        };
        if chat.handle_input(&input, &mut stdout).await? == LoopControl::Quit {
            break;
        }
    }

    debug!(messages = chat.session().len(), "Chat ended");
    Ok(())
}

pub fn use_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}
