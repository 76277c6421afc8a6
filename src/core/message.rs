use crate::api::{ChatMessage, ChatToolCall, ChatToolCallFunction, ResponseMessage};

pub use crate::api::ChatRole as Role;

/// Field names the API accepts on a message. Anything else is local state.
pub const CANONICAL_FIELDS: &[&str] = &["role", "content", "tool_calls", "tool_call_id", "name"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub function_name: String,
    pub arguments: String,
}

impl From<ChatToolCall> for ToolCall {
    fn from(call: ChatToolCall) -> Self {
        Self {
            id: call.id,
            function_name: call.function.name,
            arguments: call.function.arguments,
        }
    }
}

impl From<&ToolCall> for ChatToolCall {
    fn from(call: &ToolCall) -> Self {
        ChatToolCall {
            id: call.id.clone(),
            kind: "function".to_string(),
            function: ChatToolCallFunction {
                name: call.function_name.clone(),
                arguments: call.arguments.clone(),
            },
        }
    }
}

/// One entry of the conversation transcript.
///
/// `evaluation` is local to the transcript and never sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub tool_call_id: Option<String>,
    pub name: Option<String>,
    pub evaluation: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
            evaluation: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            evaluation: None,
        }
    }

    /// Adopt an API response message into the transcript, keeping only the
    /// fields the transcript models.
    pub fn from_response(response: ResponseMessage) -> Self {
        Self {
            role: response.role,
            content: response.content,
            tool_calls: response
                .tool_calls
                .map(|calls| calls.into_iter().map(ToolCall::from).collect()),
            tool_call_id: None,
            name: None,
            evaluation: None,
        }
    }

    pub fn with_evaluation(mut self, evaluation: impl Into<String>) -> Self {
        self.evaluation = Some(evaluation.into());
        self
    }

    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn has_content(&self) -> bool {
        self.content
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    pub fn is_tool(&self) -> bool {
        self.role == Role::Tool
    }
}

/// Projection onto the canonical wire shape.
///
/// Implemented for every message representation the crate handles so the
/// normalisation happens once, at the serialization boundary.
pub trait ToCanonical {
    fn to_canonical(&self) -> ChatMessage;
}

impl ToCanonical for Message {
    fn to_canonical(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
            tool_calls: self
                .tool_calls
                .as_ref()
                .map(|calls| calls.iter().map(ChatToolCall::from).collect()),
            tool_call_id: self.tool_call_id.clone(),
            name: self.name.clone(),
        }
    }
}

impl ToCanonical for ResponseMessage {
    fn to_canonical(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
            tool_calls: self.tool_calls.clone(),
            tool_call_id: None,
            name: None,
        }
    }
}

impl ToCanonical for ChatMessage {
    fn to_canonical(&self) -> ChatMessage {
        self.clone()
    }
}

pub fn serialize<M: ToCanonical + ?Sized>(message: &M) -> ChatMessage {
    message.to_canonical()
}

pub fn serialize_all<'a, M, I>(messages: I) -> Vec<ChatMessage>
where
    M: ToCanonical + 'a,
    I: IntoIterator<Item = &'a M>,
{
    messages.into_iter().map(|message| serialize(message)).collect()
}
