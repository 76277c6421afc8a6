use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings persisted in `config.toml`. Every field is optional; unset
/// values fall back to the built-in defaults.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Model used for new chat sessions
    pub default_model: Option<String>,
    /// Model that grades replies
    pub evaluation_model: Option<String>,
    /// OpenAI-compatible endpoint, e.g. "https://api.groq.com/openai/v1"
    pub base_url: Option<String>,
    /// Per-request timeout for API calls
    pub request_timeout_secs: Option<u64>,
}

/// Keys accepted by `codeaide set` / `codeaide unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DefaultModel,
    EvaluationModel,
    BaseUrl,
    RequestTimeout,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::DefaultModel,
        ConfigKey::EvaluationModel,
        ConfigKey::BaseUrl,
        ConfigKey::RequestTimeout,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::DefaultModel => "default-model",
            ConfigKey::EvaluationModel => "evaluation-model",
            ConfigKey::BaseUrl => "base-url",
            ConfigKey::RequestTimeout => "request-timeout",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == key)
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
