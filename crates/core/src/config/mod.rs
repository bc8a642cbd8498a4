mod credentials;
mod loader;
mod types;
mod validate;

pub use credentials::{ConfigCredentialStore, CredentialStore};
pub use loader::{default_config_path, load_config, load_config_from_str, load_config_or_default};
pub use types::*;
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing credentials: {0} (set them in [credentials] or via ALBUMLINK_CREDENTIALS__*)")]
    MissingCredentials(String),
}
