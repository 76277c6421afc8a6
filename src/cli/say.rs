//! Non-interactive "say" command: one turn, printed to stdout.

use std::error::Error;
use std::io;

use crate::cli::session::{prepare_session, report_configuration_error, SessionOptions};
use crate::core::config::Config;
use crate::core::turn::{NoopObserver, TurnOutcome};
use crate::ui::chat_loop::{error_lines, use_color};
use crate::ui::render::{render_evaluation, render_message, write_lines, RenderedLine};

pub fn outcome_lines(outcome: &TurnOutcome) -> Vec<RenderedLine> {
    let mut lines = Vec::new();
    if outcome.used_tools() {
        for tool_result in &outcome.tool_results {
            lines.extend(render_message(tool_result));
        }
        lines.push(RenderedLine::notice(""));
    }
    lines.extend(render_message(&outcome.reply));
    if let Some(evaluation) = outcome.reply.evaluation.as_deref() {
        lines.push(RenderedLine::notice(""));
        lines.extend(render_evaluation(evaluation));
    }
    lines
}

pub async fn run_say(
    prompt: Vec<String>,
    model: Option<String>,
    env_only: bool,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: codeaide say <prompt>");
        std::process::exit(1);
    }

    let config = Config::load()?;
    let options = SessionOptions {
        model,
        env_only,
        interactive: false,
    };
    let (runner, mut session) = match prepare_session(&config, &options) {
        Ok(prepared) => prepared,
        Err(err) => {
            report_configuration_error(&err);
            std::process::exit(1);
        }
    };

    let color = use_color();
    match runner.run(&mut session, &prompt, &mut NoopObserver).await {
        Ok(outcome) => {
            write_lines(&mut io::stdout(), &outcome_lines(&outcome), color)?;
            Ok(())
        }
        Err(err) => {
            write_lines(&mut io::stderr(), &error_lines(&err), color)?;
            std::process::exit(1);
        }
    }
}
