use tracing::{debug, warn};

use crate::api::{ChatMessage, ChatRole};
use crate::core::constants::EVALUATION_TEMPERATURE;
use crate::core::driver::ConversationDriver;

pub const EVALUATION_FAILED_PREFIX: &str = "Evaluation failed:";

/// Rubric prompt for grading one exchange, independent of any history.
pub fn evaluation_prompt(user_query: &str, assistant_response: &str) -> String {
    format!(
        r#"Evaluate the assistant's response:
User Query: "{user_query}"
Assistant Response: "{assistant_response}"

Criteria:
1. **Coding Relevance:** Was the response coding-related? (Yes/No)
2. **Helpfulness:** If relevant, how helpful? (1-5 or NA)
3. **Refusal Appropriateness:** If irrelevant, did the assistant refuse properly? (Yes/No/NA)

Provide evaluation starting with "Evaluation:"."#
    )
}

/// Grade a reply. Never fails: any problem is reported in the returned text.
pub async fn evaluate(
    driver: &ConversationDriver,
    user_query: &str,
    assistant_response: &str,
    model: &str,
) -> String {
    let messages = vec![ChatMessage::new(
        ChatRole::System,
        evaluation_prompt(user_query, assistant_response),
    )];

    match driver
        .complete_standalone(messages, model, EVALUATION_TEMPERATURE)
        .await
    {
        Ok(reply) => match reply.content {
            Some(text) if !text.trim().is_empty() => {
                debug!(model, chars = text.len(), "Evaluation received");
                text
            }
            _ => {
                warn!(model, "Evaluation returned no content");
                format!("{EVALUATION_FAILED_PREFIX} empty response")
            }
        },
        Err(err) => {
            warn!(model, error = %err, "Evaluation request failed");
            format!("{EVALUATION_FAILED_PREFIX} {err}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::ApiError;
    use crate::utils::test_utils::ScriptedBackend;
    use std::sync::Arc;

    #[test]
    fn prompt_embeds_both_sides_of_the_exchange() {
        let prompt = evaluation_prompt("What is Rust?", "A systems language.");
        assert!(prompt.contains(r#"User Query: "What is Rust?""#));
        assert!(prompt.contains(r#"Assistant Response: "A systems language.""#));
        assert!(prompt.contains("starting with \"Evaluation:\""));
    }

    #[tokio::test]
    async fn evaluation_text_is_returned_verbatim() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_text("Evaluation: Yes / 5 / NA");
        let driver = ConversationDriver::new(backend.clone());

        let verdict = evaluate(&driver, "q", "a", "llama3-8b-8192").await;
        assert_eq!(verdict, "Evaluation: Yes / 5 / NA");

        let request = &backend.requests()[0];
        assert_eq!(request.model, "llama3-8b-8192");
        assert_eq!(request.temperature, EVALUATION_TEMPERATURE);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, ChatRole::System);
    }

    #[tokio::test]
    async fn failures_become_markers() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_error(ApiError::Status {
            status: 503,
            message: "over capacity".to_string(),
        });
        let driver = ConversationDriver::new(backend);

        let verdict = evaluate(&driver, "q", "a", "m").await;
        assert_eq!(verdict, "Evaluation failed: HTTP 503: over capacity");
    }

    #[tokio::test]
    async fn empty_verdicts_become_markers() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_text("  ");
        let driver = ConversationDriver::new(backend);

        let verdict = evaluate(&driver, "q", "a", "m").await;
        assert!(verdict.starts_with(EVALUATION_FAILED_PREFIX));
    }
}
