//! OAuth client-credentials token lifecycle.

mod cache;
mod manager;
mod types;

pub use cache::FileTokenCache;
pub use manager::{TokenManager, EXPIRY_SAFETY_MARGIN};
pub use types::*;

use thiserror::Error;

use crate::http::TransportError;

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Token request rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Token request failed: {0}")]
    Transport(TransportError),

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

impl From<TransportError> for AuthError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::HttpStatus {
                status: status @ (400 | 401 | 403),
                body,
                ..
            } => AuthError::Rejected { status, body },
            TransportError::Decode(message) => AuthError::InvalidResponse(message),
            other => AuthError::Transport(other),
        }
    }
}
