//! Conversation driver: one chat completion call with the assistant's fixed
//! system prompt injected ahead of the transcript.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{
    ChatMessage, ChatRequest, ChatRole, ChatToolDefinition, ResponseMessage, ToolChoice,
};
use crate::core::client::{ApiError, CompletionBackend};
use crate::core::constants::{GENERATION_TEMPERATURE, SYSTEM_PROMPT};

#[derive(Clone)]
pub struct ConversationDriver {
    backend: Arc<dyn CompletionBackend>,
}

impl ConversationDriver {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Send the transcript with the system prompt prepended and return the
    /// top response message as received.
    ///
    /// System messages in `messages` are skipped; the driver owns the only
    /// system prompt the model sees. Nothing is recorded on failure.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        tools: Option<&[ChatToolDefinition]>,
        tool_choice: ToolChoice,
    ) -> Result<ResponseMessage, ApiError> {
        let request = build_request(messages, model, tools, tool_choice);
        debug!(
            model,
            history = messages.len(),
            tool_choice = ?tool_choice,
            "Requesting conversation completion"
        );
        self.backend.create(&request).await.inspect_err(|err| {
            warn!(model, error = %err, "Conversation completion failed");
        })
    }

    /// Send `messages` verbatim, without the system prompt or any tools.
    pub async fn complete_standalone(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        temperature: f32,
    ) -> Result<ResponseMessage, ApiError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature,
            tools: None,
            tool_choice: None,
        };
        self.backend.create(&request).await
    }
}

pub(crate) fn build_request(
    messages: &[ChatMessage],
    model: &str,
    tools: Option<&[ChatToolDefinition]>,
    tool_choice: ToolChoice,
) -> ChatRequest {
    let mut api_messages = Vec::with_capacity(messages.len() + 1);
    api_messages.push(ChatMessage::new(ChatRole::System, SYSTEM_PROMPT));
    api_messages.extend(
        messages
            .iter()
            .filter(|message| message.role != ChatRole::System)
            .cloned(),
    );

    ChatRequest {
        model: model.to_string(),
        messages: api_messages,
        temperature: GENERATION_TEMPERATURE,
        tools: tools.filter(|defs| !defs.is_empty()).map(<[_]>::to_vec),
        tool_choice: Some(tool_choice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tools::ToolRegistry;
    use crate::utils::test_utils::ScriptedBackend;

    #[test]
    fn request_starts_with_system_prompt() {
        let history = vec![
            ChatMessage::new(ChatRole::User, "first"),
            ChatMessage::new(ChatRole::Assistant, "reply"),
        ];
        let request = build_request(&history, "llama3-70b-8192", None, ToolChoice::Auto);

        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[0].content.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(request.messages[1..], history[..]);
        assert_eq!(request.model, "llama3-70b-8192");
        assert_eq!(request.temperature, GENERATION_TEMPERATURE);
    }

    #[test]
    fn caller_supplied_system_messages_are_dropped() {
        let history = vec![
            ChatMessage::new(ChatRole::System, "be a pirate"),
            ChatMessage::new(ChatRole::User, "hello"),
        ];
        let request = build_request(&history, "m", None, ToolChoice::Auto);
        let system_count = request
            .messages
            .iter()
            .filter(|message| message.role == ChatRole::System)
            .count();
        assert_eq!(system_count, 1);
        assert_eq!(request.messages.len(), 2);
    }

    #[test]
    fn tools_are_advertised_only_when_present() {
        let registry = ToolRegistry::builtin();
        let schema = registry.schema();
        let with_tools = build_request(&[], "m", Some(&schema), ToolChoice::Auto);
        assert_eq!(with_tools.tools.as_ref().map(Vec::len), Some(1));

        let without = build_request(&[], "m", Some(&[]), ToolChoice::None);
        assert!(without.tools.is_none());
        assert_eq!(without.tool_choice, Some(ToolChoice::None));
    }

    #[tokio::test]
    async fn complete_returns_backend_message_unmodified() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_json(serde_json::json!({
            "role": "assistant",
            "content": "Use a hash map.",
            "reasoning": "kept as received"
        }));
        let driver = ConversationDriver::new(backend.clone());

        let reply = driver
            .complete(&[ChatMessage::new(ChatRole::User, "q")], "m", None, ToolChoice::Auto)
            .await
            .expect("reply");
        assert_eq!(reply.content.as_deref(), Some("Use a hash map."));
        assert!(reply.extra.contains_key("reasoning"));
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn complete_propagates_transport_failures() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_error(ApiError::Network("connection reset".to_string()));
        let driver = ConversationDriver::new(backend);

        let err = driver
            .complete(&[], "m", None, ToolChoice::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn standalone_requests_skip_system_prompt_and_tools() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_text("Evaluation: fine");
        let driver = ConversationDriver::new(backend.clone());

        driver
            .complete_standalone(vec![ChatMessage::new(ChatRole::System, "rubric")], "m", 0.1)
            .await
            .unwrap();

        let sent = &backend.requests()[0];
        assert_eq!(sent.messages.len(), 1);
        assert_eq!(sent.messages[0].content.as_deref(), Some("rubric"));
        assert!(sent.tools.is_none());
        assert!(sent.tool_choice.is_none());
        assert_eq!(sent.temperature, 0.1);
    }
}
