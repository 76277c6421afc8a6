//! API key resolution and keyring management.
//!
//! Resolution order: the `GROQ_API_KEY` environment variable, then the key
//! stored in the platform keyring by `codeaide auth`, then an interactive
//! prompt whose answer lives only for the current session.

use crate::core::constants::API_KEY_ENV;
use crate::core::keyring::{KeyringAccessError, KeyringStore, SecretStore};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

mod ui;

pub use self::ui::{prompt_confirmation, prompt_secret, UiError, MASKED_INPUT_PROMPT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Keyring,
    Prompt,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "{API_KEY_ENV} environment variable"),
            CredentialSource::Keyring => f.write_str("system keyring"),
            CredentialSource::Prompt => f.write_str("interactive prompt"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub api_key: String,
    pub source: CredentialSource,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(
        "No Groq API key found.\n\nPlease either:\n1. Run 'codeaide auth' to store a key in your system keyring, or\n2. Set the environment variable:\n   export {API_KEY_ENV}=\"your-api-key-here\""
    )]
    MissingCredential,

    #[error(transparent)]
    Keyring(#[from] KeyringAccessError),

    #[error(transparent)]
    Config(#[from] crate::core::config::ConfigError),

    #[error("Failed to set up the HTTP client: {0}")]
    Backend(#[from] crate::core::client::ApiError),
}

pub const QUICK_FIXES: &[&str] = &[
    "codeaide auth                   # Store a key in the system keyring",
    "export GROQ_API_KEY=gsk_...     # Use an environment variable",
];

/// Resolve the API key.
///
/// `store` is `None` when keyring lookups are disabled (`--env-only`).
/// `prompt` is asked last; it returns `None` when the user declines.
/// Recoverable keyring outages fall through to the prompt; permanent
/// keyring errors are returned.
pub fn resolve_credential(
    env_value: Option<String>,
    store: Option<&dyn SecretStore>,
    prompt: &mut dyn FnMut() -> Option<String>,
) -> Result<Credential, ConfigurationError> {
    if let Some(api_key) = non_empty(env_value) {
        debug!(source = %CredentialSource::Environment, "Resolved API key");
        return Ok(Credential {
            api_key,
            source: CredentialSource::Environment,
        });
    }

    if let Some(store) = store {
        match store.get() {
            Ok(stored) => {
                if let Some(api_key) = non_empty(stored) {
                    debug!(source = %CredentialSource::Keyring, "Resolved API key");
                    return Ok(Credential {
                        api_key,
                        source: CredentialSource::Keyring,
                    });
                }
            }
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "Keyring unavailable, falling back to prompt");
            }
            Err(err) => return Err(err.into()),
        }
    }

    match non_empty(prompt()) {
        Some(api_key) => Ok(Credential {
            api_key,
            source: CredentialSource::Prompt,
        }),
        None => Err(ConfigurationError::MissingCredential),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct AuthManager {
    store: Box<dyn SecretStore>,
    use_keyring: bool,
}

impl AuthManager {
    pub fn new() -> Self {
        Self::new_with_keyring(true)
    }

    /// Construct an AuthManager, optionally disabling keyring access.
    pub fn new_with_keyring(use_keyring: bool) -> Self {
        Self {
            store: Box::new(KeyringStore::new()),
            use_keyring,
        }
    }

    #[cfg(test)]
    pub fn with_store(store: Box<dyn SecretStore>) -> Self {
        Self {
            store,
            use_keyring: true,
        }
    }

    /// Resolve a key for a chat session, asking interactively as a last
    /// resort when `interactive` is set.
    pub fn resolve(&self, interactive: bool) -> Result<Credential, ConfigurationError> {
        let env_value = std::env::var(API_KEY_ENV).ok();
        let store = self.use_keyring.then_some(&*self.store);
        let mut prompt = || {
            if !interactive {
                return None;
            }
            match prompt_secret(MASKED_INPUT_PROMPT) {
                Ok(secret) => secret,
                Err(err) => {
                    warn!(error = %err, "Could not read API key from terminal");
                    None
                }
            }
        };
        resolve_credential(env_value, store, &mut prompt)
    }

    pub fn has_stored_key(&self) -> Result<bool, KeyringAccessError> {
        Ok(self.store.get()?.is_some())
    }

    pub fn store_key(&self, api_key: &str) -> Result<(), KeyringAccessError> {
        self.store.set(api_key.trim())
    }

    pub fn remove_key(&self) -> Result<bool, KeyringAccessError> {
        self.store.delete()
    }

    pub fn interactive_auth(&self) -> Result<(), Box<dyn std::error::Error>> {
        println!("🔐 Codeaide Authentication Setup");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("Get a key from https://console.groq.com/keys");
        println!();

        if self.has_stored_key()? && !prompt_confirmation("A key is already stored. Replace it?")? {
            println!("Cancelled.");
            return Ok(());
        }

        let Some(api_key) = prompt_secret(MASKED_INPUT_PROMPT)? else {
            println!("Cancelled.");
            return Ok(());
        };
        self.store_key(&api_key)?;

        println!("✅ API key stored securely in your system keyring.");
        if std::env::var(API_KEY_ENV).is_ok() {
            println!("⚠️  {API_KEY_ENV} is set and takes precedence over the stored key.");
        }
        Ok(())
    }

    pub fn interactive_deauth(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.has_stored_key()? {
            println!("No stored API key to remove.");
            return Ok(());
        }
        if !prompt_confirmation("Remove the stored Groq API key?")? {
            println!("Cancelled.");
            return Ok(());
        }
        self.remove_key()?;
        println!("✅ Stored API key removed.");
        Ok(())
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}
