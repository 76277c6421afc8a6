//! HTTP transport for chat completions.
//!
//! [`CompletionBackend`] is the seam between turn orchestration and the
//! network. [`HttpBackend`] talks to an OpenAI-compatible endpoint; tests
//! substitute scripted backends.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::api::{ChatCompletionResponse, ChatRequest, ResponseMessage};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout and the like.
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be decoded as a chat completion.
    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("API returned no choices")]
    EmptyChoices,
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one chat completion request and return the top choice's message.
    async fn create(&self, request: &ChatRequest) -> Result<ResponseMessage, ApiError>;
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl CompletionBackend for HttpBackend {
    async fn create(&self, request: &ChatRequest) -> Result<ResponseMessage, ApiError> {
        let url = construct_api_url(&self.base_url, "chat/completions");
        debug!(
            url = %url,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            temperature = request.temperature,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Chat completion request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: format_api_error(&body),
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ApiError::EmptyChoices)?;
        debug!(
            finish_reason = choice.finish_reason.as_deref().unwrap_or("<none>"),
            tool_calls = choice.message.has_tool_calls(),
            "Chat completion received"
        );
        Ok(choice.message)
    }
}

/// Join a base URL and an endpoint path without doubling slashes.
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Render an error body for the transcript: a one-line summary when the
/// body is JSON with a recognisable message, followed by the body itself.
pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Ok(pretty_json) = serde_json::to_string_pretty(&json_value) {
            return match extract_error_summary(&json_value) {
                Some(summary) if !summary.is_empty() => {
                    format!("{summary}\n```json\n{pretty_json}\n```")
                }
                _ => format!("```json\n{pretty_json}\n```"),
            };
        }
    }

    trimmed.to_string()
}
