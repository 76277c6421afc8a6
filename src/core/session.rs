use crate::api::ChatMessage;
use crate::core::message::{serialize_all, Message};

/// The transcript of one chat session plus the model it talks to.
///
/// Messages are append-only. The only in-place edit is attaching an
/// evaluation to the latest assistant message; the only removal is
/// [`ConversationSession::clear`].
#[derive(Debug, Clone)]
pub struct ConversationSession {
    messages: Vec<Message>,
    model: String,
}

impl ConversationSession {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.is_assistant() && message.has_content())
    }

    /// Attach an evaluation to the most recent assistant reply. Returns
    /// false when there is no assistant reply to attach to.
    pub fn attach_evaluation(&mut self, evaluation: impl Into<String>) -> bool {
        match self
            .messages
            .iter_mut()
            .rev()
            .find(|message| message.is_assistant() && message.has_content())
        {
            Some(message) => {
                message.evaluation = Some(evaluation.into());
                true
            }
            None => false,
        }
    }

    pub fn canonical_history(&self) -> Vec<ChatMessage> {
        serialize_all(&self.messages)
    }
}
