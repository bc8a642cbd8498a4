//! Resilient HTTP calling convention.
//!
//! A single attempt is delegated to an [`HttpBackend`]; [`ResilientTransport`]
//! layers per-attempt timeouts, bounded retries with deterministic backoff and
//! an optional shared deadline on top of it.

mod reqwest_backend;
mod retry;
mod transport;
mod types;

pub use reqwest_backend::ReqwestBackend;
pub use retry::RetryPolicy;
pub use transport::ResilientTransport;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single attempt, as reported by a backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The attempt did not complete within its timeout.
    #[error("request timed out")]
    Timeout,

    /// Could not establish a connection.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Connection-level failure after connecting (reset, truncated body...).
    #[error("network error: {0}")]
    Network(String),

    /// The request itself is malformed; retrying cannot help.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors surfaced by the transport once its retry policy is exhausted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("network error after {attempts} attempt(s): {message}")]
    Network { message: String, attempts: u32 },

    #[error("HTTP {status} after {attempts} attempt(s): {body}")]
    HttpStatus {
        status: u16,
        body: String,
        attempts: u32,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Whether this failure class is retried by the transport.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::HttpStatus { status, .. } => is_transient_status(*status),
            Self::InvalidRequest(_) | Self::Decode(_) => false,
        }
    }

    /// HTTP status code, when the failure was a status response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Timeout { attempts }
            | Self::Network { attempts, .. }
            | Self::HttpStatus { attempts, .. } => *attempts,
            Self::InvalidRequest(_) | Self::Decode(_) => 1,
        }
    }
}

/// 429 and every 5xx are worth retrying.
pub fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

/// Performs exactly one HTTP attempt.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Send the request once. Non-2xx statuses are returned as `Ok`.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient_status(429));
        assert!(is_transient_status(500));
        assert!(is_transient_status(503));
        assert!(!is_transient_status(400));
        assert!(!is_transient_status(401));
        assert!(!is_transient_status(404));
    }

    #[test]
    fn test_transport_error_classification() {
        assert!(TransportError::Timeout { attempts: 4 }.is_transient());
        assert!(!TransportError::Decode("bad".into()).is_transient());

        let err = TransportError::HttpStatus {
            status: 404,
            body: "missing".into(),
            attempts: 1,
        };
        assert!(!err.is_transient());
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.attempts(), 1);
    }
}
