//! Per-turn orchestration.
//!
//! A turn walks a short linear state machine:
//!
//! ```text
//! Idle -> AwaitingFirstCompletion -> ToolRequested -> AwaitingToolResults
//!                                        -> AwaitingSecondCompletion -> AwaitingEvaluation -> Idle
//!                                 -> DirectReply -> AwaitingEvaluation -> Idle
//! ```
//!
//! The user message is committed as soon as the turn starts. Everything the
//! model produces is committed only once a reply with content exists, so an
//! aborted turn leaves the transcript at "previous exchange + user message".
//! The evaluation is attached to the committed reply afterwards and cannot
//! abort the turn.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::ToolChoice;
use crate::core::client::ApiError;
use crate::core::driver::ConversationDriver;
use crate::core::evaluator::evaluate;
use crate::core::message::{serialize_all, Message};
use crate::core::session::ConversationSession;
use crate::core::tools::{error_result, ToolRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingFirstCompletion,
    ToolRequested,
    AwaitingToolResults,
    AwaitingSecondCompletion,
    DirectReply,
    AwaitingEvaluation,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TurnState::Idle => "Idle",
            TurnState::AwaitingFirstCompletion => "Thinking...",
            TurnState::ToolRequested => "Tool requested",
            TurnState::AwaitingToolResults => "Calling tools...",
            TurnState::AwaitingSecondCompletion => "Processing results...",
            TurnState::DirectReply => "Reply received",
            TurnState::AwaitingEvaluation => "Evaluating...",
        };
        f.write_str(label)
    }
}

/// Receives progress while a turn runs.
pub trait TurnObserver {
    fn on_state(&mut self, _state: TurnState) {}

    fn on_tool_result(&mut self, _message: &Message) {}

    /// Called once the reply is committed, before it is evaluated.
    fn on_reply(&mut self, _message: &Message) {}
}

pub struct NoopObserver;

impl TurnObserver for NoopObserver {}

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Message cannot be empty")]
    EmptyPrompt,

    #[error("Error during conversation: {0}")]
    Api(#[from] ApiError),

    /// The model answered without any text to show.
    #[error("The model returned an empty reply")]
    EmptyReply,
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The stored assistant reply, evaluation attached.
    pub reply: Message,
    /// Tool messages committed during the turn, in call order.
    pub tool_results: Vec<Message>,
}

impl TurnOutcome {
    pub fn used_tools(&self) -> bool {
        !self.tool_results.is_empty()
    }
}

pub struct TurnRunner {
    driver: ConversationDriver,
    tools: ToolRegistry,
    evaluation_model: String,
}

impl TurnRunner {
    pub fn new(
        driver: ConversationDriver,
        tools: ToolRegistry,
        evaluation_model: impl Into<String>,
    ) -> Self {
        Self {
            driver,
            tools,
            evaluation_model: evaluation_model.into(),
        }
    }

    pub fn evaluation_model(&self) -> &str {
        &self.evaluation_model
    }

    pub async fn run(
        &self,
        session: &mut ConversationSession,
        prompt: &str,
        observer: &mut dyn TurnObserver,
    ) -> Result<TurnOutcome, TurnError> {
        if prompt.trim().is_empty() {
            return Err(TurnError::EmptyPrompt);
        }

        session.push(Message::user(prompt));
        let model = session.model().to_string();
        info!(model = %model, history = session.len(), "Starting turn");

        observer.on_state(TurnState::AwaitingFirstCompletion);
        let mut history = session.canonical_history();
        let schema = self.tools.schema();
        let advertised = (!self.tools.is_empty()).then_some(schema.as_slice());
        let first = self
            .driver
            .complete(&history, &model, advertised, ToolChoice::Auto)
            .await?;

        let mut staged = Vec::new();
        let reply_text = if first.has_tool_calls() {
            observer.on_state(TurnState::ToolRequested);
            let carrier = Message::from_response(first);
            let calls = carrier.tool_calls.clone().unwrap_or_default();
            debug!(calls = calls.len(), "Model requested tools");
            staged.push(carrier);

            observer.on_state(TurnState::AwaitingToolResults);
            for call in &calls {
                let result = self.tools.invoke(call).unwrap_or_else(|err| {
                    warn!(
                        tool = %call.function_name,
                        error = %err,
                        "Model requested an unregistered tool"
                    );
                    error_result(call, &err)
                });
                observer.on_tool_result(&result);
                staged.push(result);
            }

            observer.on_state(TurnState::AwaitingSecondCompletion);
            history.extend(serialize_all(&staged));
            let second = self
                .driver
                .complete(&history, &model, None, ToolChoice::None)
                .await?;
            second.content
        } else {
            observer.on_state(TurnState::DirectReply);
            first.content
        };

        let Some(reply_text) = reply_text.filter(|text| !text.trim().is_empty()) else {
            warn!(model = %model, "Turn produced no reply content");
            return Err(TurnError::EmptyReply);
        };

        let tool_results: Vec<Message> = staged.iter().filter(|m| m.is_tool()).cloned().collect();
        session.extend(staged);
        session.push(Message::assistant(reply_text.as_str()));
        if let Some(reply) = session.last_assistant() {
            observer.on_reply(reply);
        }

        observer.on_state(TurnState::AwaitingEvaluation);
        let evaluation = evaluate(&self.driver, prompt, &reply_text, &self.evaluation_model).await;
        session.attach_evaluation(evaluation.as_str());
        let reply = Message::assistant(reply_text).with_evaluation(evaluation);

        observer.on_state(TurnState::Idle);
        info!(model = %model, history = session.len(), tools = tool_results.len(), "Turn complete");

        Ok(TurnOutcome {
            reply,
            tool_results,
        })
    }
}

#[cfg(test)]
mod tests;
