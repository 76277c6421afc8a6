use crate::core::config::data::{Config, ConfigKey};
use crate::core::config::io::ConfigError;
use crate::core::constants::{
    is_known_model, DEFAULT_BASE_URL, DEFAULT_EVALUATION_MODEL, DEFAULT_MODEL,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use std::time::Duration;

impl Config {
    pub fn model(&self) -> &str {
        self.default_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn evaluation_model(&self) -> &str {
        self.evaluation_model
            .as_deref()
            .unwrap_or(DEFAULT_EVALUATION_MODEL)
    }

    /// Endpoint to use, with an environment override taking precedence over
    /// the file.
    pub fn base_url(&self, env_override: Option<String>) -> String {
        env_override
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let parsed = ConfigKey::parse(key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(invalid(parsed, "value cannot be empty"));
        }

        match parsed {
            ConfigKey::DefaultModel => {
                if !is_known_model(value) {
                    return Err(invalid(parsed, "not one of the selectable models"));
                }
                self.default_model = Some(value.to_string());
            }
            ConfigKey::EvaluationModel => self.evaluation_model = Some(value.to_string()),
            ConfigKey::BaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid(parsed, "expected an http(s) URL"));
                }
                self.base_url = Some(value.trim_end_matches('/').to_string());
            }
            ConfigKey::RequestTimeout => {
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| invalid(parsed, "expected a positive number of seconds"))?;
                self.request_timeout_secs = Some(secs);
            }
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), ConfigError> {
        match ConfigKey::parse(key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))? {
            ConfigKey::DefaultModel => self.default_model = None,
            ConfigKey::EvaluationModel => self.evaluation_model = None,
            ConfigKey::BaseUrl => self.base_url = None,
            ConfigKey::RequestTimeout => self.request_timeout_secs = None,
        }
        Ok(())
    }
}

fn invalid(key: ConfigKey, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.as_str().to_string(),
        reason: reason.to_string(),
    }
}
