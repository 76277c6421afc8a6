//! Wiring shared by `chat` and `say`: configuration, credential and model
//! selection resolved into a ready [`TurnRunner`] and empty session.

use std::sync::Arc;

use tracing::info;

use crate::auth::{AuthManager, ConfigurationError, QUICK_FIXES};
use crate::core::client::HttpBackend;
use crate::core::config::{Config, ConfigError};
use crate::core::constants::{is_known_model, AVAILABLE_MODELS, BASE_URL_ENV};
use crate::core::driver::ConversationDriver;
use crate::core::session::ConversationSession;
use crate::core::tools::ToolRegistry;
use crate::core::turn::TurnRunner;

pub struct SessionOptions {
    pub model: Option<String>,
    pub env_only: bool,
    pub interactive: bool,
}

/// Pick the chat model: the `-m` flag, else the configured default.
pub fn select_model(config: &Config, flag: Option<&str>) -> Result<String, ConfigError> {
    let model = flag.unwrap_or_else(|| config.model());
    if !is_known_model(model) {
        return Err(ConfigError::InvalidValue {
            key: "model".to_string(),
            reason: format!(
                "'{model}' is not one of: {}",
                AVAILABLE_MODELS.join(", ")
            ),
        });
    }
    Ok(model.to_string())
}

pub fn prepare_session(
    config: &Config,
    options: &SessionOptions,
) -> Result<(TurnRunner, ConversationSession), ConfigurationError> {
    let model = select_model(config, options.model.as_deref())?;

    let auth_manager = AuthManager::new_with_keyring(!options.env_only);
    let credential = auth_manager.resolve(options.interactive)?;

    let base_url = config.base_url(std::env::var(BASE_URL_ENV).ok());
    info!(
        model = %model,
        base_url = %base_url,
        credential = %credential.source,
        "Preparing chat session"
    );

    let backend = HttpBackend::new(base_url, credential.api_key, config.request_timeout())?;
    let runner = TurnRunner::new(
        ConversationDriver::new(Arc::new(backend)),
        ToolRegistry::builtin(),
        config.evaluation_model(),
    );
    Ok((runner, ConversationSession::new(model)))
}

/// Print a configuration error with hints, in the CLI's usual shape.
pub fn report_configuration_error(err: &ConfigurationError) {
    eprintln!("❌ {err}");
    if matches!(err, ConfigurationError::MissingCredential) {
        eprintln!();
        eprintln!("💡 Quick fixes:");
        for fix in QUICK_FIXES {
            eprintln!("  • {fix}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_overrides_configured_model() {
        let config = Config {
            default_model: Some("gemma-7b-it".to_string()),
            ..Config::default()
        };
        assert_eq!(select_model(&config, None).unwrap(), "gemma-7b-it");
        assert_eq!(
            select_model(&config, Some("llama3-70b-8192")).unwrap(),
            "llama3-70b-8192"
        );
    }

    #[test]
    fn unknown_models_are_rejected() {
        let err = select_model(&Config::default(), Some("gpt-4o")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("gpt-4o"));
        assert!(message.contains("llama3-8b-8192"));
    }

    #[test]
    fn default_model_is_used_without_flag_or_config() {
        assert_eq!(
            select_model(&Config::default(), None).unwrap(),
            "llama3-8b-8192"
        );
    }
}
