use thiserror::Error;

const KEYRING_SERVICE: &str = "codeaide";
const KEYRING_ACCOUNT: &str = "groq";

/// Describes failures when attempting to access the system keyring.
///
/// Recoverable errors indicate that the credential backend was
/// temporarily unavailable (for example when the keychain service is
/// locked or inaccessible). Permanent errors surface the underlying
/// cause directly so callers can report them to the user.
#[derive(Debug, Error)]
pub enum KeyringAccessError {
    #[error("keyring unavailable: {0}")]
    Recoverable(#[source] keyring::Error),

    #[error("keyring error: {0}")]
    Permanent(#[source] keyring::Error),
}

impl KeyringAccessError {
    /// Returns true when the error represents a temporary outage of the
    /// platform keyring backend.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeyringAccessError::Recoverable(_))
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

/// Somewhere an API key can be kept between runs.
pub trait SecretStore {
    fn get(&self) -> Result<Option<String>, KeyringAccessError>;
    fn set(&self, secret: &str) -> Result<(), KeyringAccessError>;
    /// Returns false when there was nothing to delete.
    fn delete(&self) -> Result<bool, KeyringAccessError>;
}

/// The platform keyring entry holding the Groq API key.
pub struct KeyringStore {
    service: String,
    account: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            account: KEYRING_ACCOUNT.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, KeyringAccessError> {
        Ok(keyring::Entry::new(&self.service, &self.account)?)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringStore {
    fn get(&self) -> Result<Option<String>, KeyringAccessError> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, secret: &str) -> Result<(), KeyringAccessError> {
        Ok(self.entry()?.set_password(secret)?)
    }

    fn delete(&self) -> Result<bool, KeyringAccessError> {
        match self.entry()?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
