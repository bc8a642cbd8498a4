//! Credential store backed by the loaded configuration.

use crate::auth::Credentials;

use super::{Config, ConfigError};

/// Source of catalog API credentials.
pub trait CredentialStore: Send + Sync {
    /// Load the client id/secret pair.
    fn load(&self) -> Result<Credentials, ConfigError>;
}

/// Reads credentials from the `[credentials]` section (file + environment).
#[derive(Debug, Clone)]
pub struct ConfigCredentialStore {
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl ConfigCredentialStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client_id: config.credentials.client_id.clone(),
            client_secret: config.credentials.client_secret.clone(),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CredentialStore for ConfigCredentialStore {
    fn load(&self) -> Result<Credentials, ConfigError> {
        match (present(&self.client_id), present(&self.client_secret)) {
            (Some(id), Some(secret)) => Ok(Credentials::new(id, secret)),
            (None, None) => Err(ConfigError::MissingCredentials(
                "client_id, client_secret".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingCredentials("client_id".to_string())),
            (Some(_), None) => Err(ConfigError::MissingCredentials(
                "client_secret".to_string(),
            )),
        }
    }
}
