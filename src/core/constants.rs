//! Shared constants used across the application

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const API_KEY_ENV: &str = "GROQ_API_KEY";
pub const BASE_URL_ENV: &str = "GROQ_BASE_URL";

pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_EVALUATION_MODEL: &str = "llama3-8b-8192";

/// Models offered by the model picker, in display order.
pub const AVAILABLE_MODELS: &[&str] = &[
    "llama3-8b-8192",
    "llama3-70b-8192",
    "mixtral-8x7b-32768",
    "gemma-7b-it",
];

pub const GENERATION_TEMPERATURE: f32 = 0.7;
pub const EVALUATION_TEMPERATURE: f32 = 0.1;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const SYSTEM_PROMPT: &str = "You are a specialized Coding Assistant AI with access to previous conversation history.
Your primary function is to help users with programming and coding-related questions.

You have access to the entire conversation history and should use it to provide context-aware responses.
Remember all previous interactions and function calls made during this conversation.

Strictly adhere to the following rules:
1. ONLY answer questions directly related to coding, programming languages, algorithms, data structures, software development tools, and concepts.
2. If the user asks a question NOT related to coding, politely refuse to answer.
3. Provide clear, concise, and accurate coding explanations or code snippets.
4. Use the get_current_datetime function when needed for time-sensitive coding questions.
5. Reference previous conversation context when answering follow-up questions.";

pub fn is_known_model(model: &str) -> bool {
    AVAILABLE_MODELS.contains(&model)
}
