use crate::api::{ChatRequest, ResponseMessage};
use crate::core::client::{ApiError, CompletionBackend};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A completion backend that replays queued responses and records every
/// request it receives.
#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<ResponseMessage, ApiError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, message: serde_json::Value) {
        let parsed: ResponseMessage =
            serde_json::from_value(message).expect("scripted message must parse");
        self.responses.lock().unwrap().push_back(Ok(parsed));
    }

    pub fn push_text(&self, content: &str) {
        self.push_json(serde_json::json!({"role": "assistant", "content": content}));
    }

    pub fn push_empty(&self) {
        self.push_json(serde_json::json!({"role": "assistant", "content": null}));
    }

    pub fn push_tool_call(&self, id: &str, name: &str) {
        self.push_json(serde_json::json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": id,
                "type": "function",
                "function": {"name": name, "arguments": "{}"}
            }]
        }));
    }

    pub fn push_error(&self, error: ApiError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn create(&self, request: &ChatRequest) -> Result<ResponseMessage, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted response left".to_string())))
    }
}
