use super::*;
use crate::api::ChatRole;
use crate::core::constants::SYSTEM_PROMPT;
use crate::core::message::Role;
use crate::core::tools::{RegisteredTool, CURRENT_DATETIME_TOOL};
use crate::utils::test_utils::ScriptedBackend;
use chrono::DateTime;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Default)]
struct RecordingObserver {
    states: Vec<TurnState>,
    tool_results: Vec<Message>,
    replies: Vec<Message>,
}

impl TurnObserver for RecordingObserver {
    fn on_state(&mut self, state: TurnState) {
        self.states.push(state);
    }

    fn on_tool_result(&mut self, message: &Message) {
        self.tool_results.push(message.clone());
    }

    fn on_reply(&mut self, message: &Message) {
        self.replies.push(message.clone());
    }
}

fn runner_with(backend: Arc<ScriptedBackend>, tools: ToolRegistry) -> TurnRunner {
    TurnRunner::new(ConversationDriver::new(backend), tools, "llama3-8b-8192")
}

fn runner(backend: Arc<ScriptedBackend>) -> TurnRunner {
    runner_with(backend, ToolRegistry::builtin())
}

fn broken_clock(_: &str) -> Result<String, String> {
    Err("clock unavailable".to_string())
}

#[tokio::test]
async fn direct_reply_is_committed_with_evaluation() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text("A binary search tree keeps smaller keys on the left.");
    backend.push_text("Evaluation: Coding Relevance: Yes, Helpfulness: 5");
    let runner = runner(backend.clone());
    let mut session = ConversationSession::new("llama3-8b-8192");
    let mut observer = RecordingObserver::default();

    let outcome = runner
        .run(&mut session, "What is a binary search tree?", &mut observer)
        .await
        .expect("turn succeeds");

    assert!(!outcome.used_tools());
    assert_eq!(session.len(), 2);
    let reply = &session.messages()[1];
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(
        reply.content_str(),
        "A binary search tree keeps smaller keys on the left."
    );
    assert_eq!(
        reply.evaluation.as_deref(),
        Some("Evaluation: Coding Relevance: Yes, Helpfulness: 5")
    );
    assert_eq!(outcome.reply, *reply);

    assert_eq!(
        observer.states,
        vec![
            TurnState::AwaitingFirstCompletion,
            TurnState::DirectReply,
            TurnState::AwaitingEvaluation,
            TurnState::Idle,
        ]
    );
    assert_eq!(observer.replies.len(), 1);
    assert_eq!(observer.replies[0].evaluation, None);

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    let first = &requests[0];
    assert_eq!(first.messages[0].content.as_deref(), Some(SYSTEM_PROMPT));
    assert_eq!(first.messages[1].content.as_deref(), Some("What is a binary search tree?"));
    assert_eq!(first.tool_choice, Some(ToolChoice::Auto));
    assert_eq!(first.tools.as_ref().map(Vec::len), Some(1));
    assert_eq!(requests[1].messages.len(), 1);
}

#[tokio::test]
async fn tool_call_round_trip_commits_carrier_tool_result_and_reply() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_tool_call("call_1", CURRENT_DATETIME_TOOL);
    backend.push_text("It is currently 10:42.");
    backend.push_text("Evaluation: Coding Relevance: No");
    let runner = runner(backend.clone());
    let mut session = ConversationSession::new("llama3-70b-8192");
    let mut observer = RecordingObserver::default();

    let outcome = runner
        .run(&mut session, "What time is it?", &mut observer)
        .await
        .expect("turn succeeds");

    let roles: Vec<Role> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]
    );

    let carrier = &session.messages()[1];
    assert!(carrier.content.is_none());
    assert_eq!(carrier.tool_calls.as_ref().map(Vec::len), Some(1));

    let tool = &session.messages()[2];
    assert_eq!(tool.tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(tool.name.as_deref(), Some(CURRENT_DATETIME_TOOL));
    let payload: Value = serde_json::from_str(tool.content_str()).unwrap();
    let stamp = payload["current_datetime"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(stamp).is_ok());

    assert_eq!(session.messages()[3].content_str(), "It is currently 10:42.");
    assert!(outcome.used_tools());
    assert_eq!(outcome.tool_results.len(), 1);
    assert_eq!(observer.tool_results.len(), 1);

    assert_eq!(
        observer.states,
        vec![
            TurnState::AwaitingFirstCompletion,
            TurnState::ToolRequested,
            TurnState::AwaitingToolResults,
            TurnState::AwaitingSecondCompletion,
            TurnState::AwaitingEvaluation,
            TurnState::Idle,
        ]
    );

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    let second = &requests[1];
    assert_eq!(second.tool_choice, Some(ToolChoice::None));
    assert!(second.tools.is_none());
    let second_roles: Vec<ChatRole> = second.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        second_roles,
        vec![ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::Tool]
    );
    assert_eq!(second.model, "llama3-70b-8192");
    assert_eq!(requests[2].model, "llama3-8b-8192");
}

#[tokio::test]
async fn first_completion_failure_keeps_only_the_user_message() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_error(ApiError::Network("connection refused".to_string()));
    let runner = runner(backend.clone());
    let mut session = ConversationSession::new("m");
    session.push(Message::user("earlier"));
    session.push(Message::assistant("earlier reply"));
    let before = session.len();

    let err = runner
        .run(&mut session, "What is a heap?", &mut NoopObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, TurnError::Api(ApiError::Network(_))));
    assert_eq!(session.len(), before + 1);
    assert_eq!(session.messages()[before].content_str(), "What is a heap?");
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn second_completion_failure_discards_staged_tool_messages() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_tool_call("call_1", CURRENT_DATETIME_TOOL);
    backend.push_error(ApiError::Status {
        status: 500,
        message: "internal".to_string(),
    });
    let runner = runner(backend.clone());
    let mut session = ConversationSession::new("m");

    let err = runner
        .run(&mut session, "What time is it?", &mut NoopObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, TurnError::Api(ApiError::Status { status: 500, .. })));
    assert_eq!(session.len(), 1);
    assert!(session.messages()[0].is_user());
    assert_eq!(backend.remaining(), 0);
}

#[tokio::test]
async fn failing_tool_still_reaches_second_completion() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_tool_call("call_7", CURRENT_DATETIME_TOOL);
    backend.push_text("I could not read the clock.");
    backend.push_text("Evaluation: ok");
    let mut tools = ToolRegistry::builtin();
    tools.register(RegisteredTool::new(
        CURRENT_DATETIME_TOOL,
        "Get the current date and time",
        json!({"type": "object", "properties": {}, "required": []}),
        broken_clock,
    ));
    let runner = runner_with(backend.clone(), tools);
    let mut session = ConversationSession::new("m");

    runner
        .run(&mut session, "What time is it?", &mut NoopObserver)
        .await
        .expect("turn continues past tool failure");

    let tool = &session.messages()[2];
    assert!(tool.is_tool());
    assert!(tool.has_content());
    assert_eq!(tool.content_str(), "Error: clock unavailable");
    assert_eq!(backend.requests().len(), 3);

    let sent_tool = &backend.requests()[1].messages[3];
    assert_eq!(sent_tool.content.as_deref(), Some("Error: clock unavailable"));
}

#[tokio::test]
async fn unregistered_tool_requests_get_error_results() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_tool_call("call_x", "delete_everything");
    backend.push_text("That tool does not exist.");
    backend.push_text("Evaluation: NA");
    let runner = runner(backend);
    let mut session = ConversationSession::new("m");

    let outcome = runner
        .run(&mut session, "do it", &mut NoopObserver)
        .await
        .expect("turn completes");

    let tool = &outcome.tool_results[0];
    assert_eq!(tool.tool_call_id.as_deref(), Some("call_x"));
    assert_eq!(tool.content_str(), "Error: Unknown tool: delete_everything");
}

#[tokio::test]
async fn evaluation_failure_does_not_block_the_reply() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text("Use a VecDeque.");
    backend.push_error(ApiError::Network("timed out".to_string()));
    let runner = runner(backend);
    let mut session = ConversationSession::new("m");

    let outcome = runner
        .run(&mut session, "Which queue type?", &mut NoopObserver)
        .await
        .expect("turn succeeds");

    let reply = &session.messages()[1];
    assert_eq!(reply.content_str(), "Use a VecDeque.");
    let evaluation = reply.evaluation.as_deref().unwrap();
    assert!(evaluation.starts_with("Evaluation failed:"));
    assert_eq!(outcome.reply.evaluation.as_deref(), Some(evaluation));
}

#[tokio::test]
async fn empty_direct_reply_aborts_the_turn() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_empty();
    let runner = runner(backend.clone());
    let mut session = ConversationSession::new("m");

    let err = runner
        .run(&mut session, "hello?", &mut NoopObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, TurnError::EmptyReply));
    assert_eq!(session.len(), 1);
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn whitespace_only_direct_reply_counts_as_empty() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text(" \n\t ");
    let runner = runner(backend.clone());
    let mut session = ConversationSession::new("m");
    let mut observer = RecordingObserver::default();

    let err = runner
        .run(&mut session, "Explain lifetimes", &mut observer)
        .await
        .unwrap_err();

    assert!(matches!(err, TurnError::EmptyReply));
    assert_eq!(session.len(), 1);
    assert!(observer.replies.is_empty());
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn empty_reply_after_tools_discards_the_tool_exchange() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_tool_call("call_1", CURRENT_DATETIME_TOOL);
    backend.push_text("   ");
    let runner = runner(backend);
    let mut session = ConversationSession::new("m");

    let err = runner
        .run(&mut session, "What time is it?", &mut NoopObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, TurnError::EmptyReply));
    assert_eq!(session.len(), 1);
}

#[tokio::test]
async fn blank_prompts_never_start_a_turn() {
    let backend = Arc::new(ScriptedBackend::new());
    let runner = runner(backend.clone());
    let mut session = ConversationSession::new("m");

    let err = runner
        .run(&mut session, "  \n", &mut NoopObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, TurnError::EmptyPrompt));
    assert!(session.is_empty());
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn later_turns_send_the_full_history_without_evaluations() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text("First answer.");
    backend.push_text("Evaluation: 4");
    backend.push_text("Second answer.");
    backend.push_text("Evaluation: 5");
    let runner = runner(backend.clone());
    let mut session = ConversationSession::new("m");

    runner
        .run(&mut session, "first question", &mut NoopObserver)
        .await
        .unwrap();
    runner
        .run(&mut session, "follow-up", &mut NoopObserver)
        .await
        .unwrap();

    assert_eq!(session.len(), 4);
    let third = &backend.requests()[2];
    let contents: Vec<&str> = third
        .messages
        .iter()
        .skip(1)
        .map(|m| m.content.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(contents, vec!["first question", "First answer.", "follow-up"]);

    let body = serde_json::to_string(third).unwrap();
    assert!(!body.contains("evaluation"));
    assert!(!body.contains("Evaluation: 4"));
}

#[tokio::test]
async fn empty_registry_advertises_no_tools() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text("Sure.");
    backend.push_text("Evaluation: 3");
    let runner = runner_with(backend.clone(), ToolRegistry::empty());
    let mut session = ConversationSession::new("m");

    runner
        .run(&mut session, "q", &mut NoopObserver)
        .await
        .unwrap();

    assert!(backend.requests()[0].tools.is_none());
}
