//! Tool registry and dispatcher.
//!
//! Tools are plain functions over the raw argument text. A failing tool never
//! breaks the conversation: its error becomes the content of the tool
//! message so the follow-up completion still sees a response for every call.

use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Local};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ChatToolDefinition, ChatToolFunction};
use crate::core::message::{Message, ToolCall};

pub const CURRENT_DATETIME_TOOL: &str = "get_current_datetime";

pub type ToolHandler = fn(&str) -> Result<String, String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

#[derive(Clone)]
pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    handler: ToolHandler,
}

impl RegisteredTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }

    fn definition(&self) -> ChatToolDefinition {
        ChatToolDefinition {
            kind: "function".to_string(),
            function: ChatToolFunction {
                name: self.name.clone(),
                description: Some(self.description.clone()),
                parameters: self.parameters.clone(),
            },
        }
    }

    fn run(&self, arguments: &str) -> Result<String, String> {
        let handler = self.handler;
        match panic::catch_unwind(AssertUnwindSafe(|| handler(arguments))) {
            Ok(result) => result,
            Err(payload) => Err(panic_message(payload.as_ref())),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "tool panicked".to_string())
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The registry advertised to the model: just the clock.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(RegisteredTool::new(
            CURRENT_DATETIME_TOOL,
            "Get the current date and time",
            json!({
                "type": "object",
                "properties": {},
                "required": [],
            }),
            get_current_datetime,
        ));
        registry
    }

    /// Add a tool, replacing any existing tool with the same name.
    pub fn register(&mut self, tool: RegisteredTool) {
        self.tools.retain(|existing| existing.name != tool.name);
        self.tools.push(tool);
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn schema(&self) -> Vec<ChatToolDefinition> {
        self.tools.iter().map(RegisteredTool::definition).collect()
    }

    /// Run the tool named by `call` and wrap its output as a tool message.
    pub fn invoke(&self, call: &ToolCall) -> Result<Message, DispatchError> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name == call.function_name)
            .ok_or_else(|| DispatchError::UnknownTool(call.function_name.clone()))?;

        debug!(tool = %tool.name, call_id = %call.id, "Invoking tool");
        let content = match tool.run(&call.arguments) {
            Ok(output) => output,
            Err(err) => {
                warn!(tool = %tool.name, call_id = %call.id, error = %err, "Tool failed");
                error_content(&err)
            }
        };
        Ok(Message::tool_result(&call.id, &call.function_name, content))
    }
}

/// Tool message for a call that could not be run at all.
pub fn error_result(call: &ToolCall, err: &DispatchError) -> Message {
    Message::tool_result(&call.id, &call.function_name, error_content(&err.to_string()))
}

fn error_content(message: &str) -> String {
    if message.trim().is_empty() {
        "Error: tool failed without a message".to_string()
    } else {
        format!("Error: {message}")
    }
}

pub fn get_current_datetime(_arguments: &str) -> Result<String, String> {
    Ok(current_datetime_payload(Local::now()))
}

pub fn current_datetime_payload(now: DateTime<Local>) -> String {
    json!({ "current_datetime": now.to_rfc3339() }).to_string()
}
