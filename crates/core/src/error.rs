//! Pipeline-level error taxonomy.

use thiserror::Error;

use crate::auth::AuthError;
use crate::catalog::SearchError;
use crate::config::ConfigError;
use crate::query::ValidationError;
use crate::selector::SelectionError;

/// Process exit statuses used by the CLI.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const CANCELLED: i32 = 130;
}

/// Why a resolution did not produce a selection.
///
/// `NoResults` is an ordinary outcome, kept apart from real failures so
/// callers can tell "not found" from "request failed".
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("no results for \"{query}\"")]
    NoResults { query: String },

    #[error("{0}")]
    Selection(#[from] SelectionError),
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NoResults { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolveError::Selection(SelectionError::Cancelled))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ResolveError::NoResults { .. } => exit_code::NOT_FOUND,
            ResolveError::Config(_)
            | ResolveError::Validation(_)
            | ResolveError::Search(SearchError::Auth(AuthError::MissingCredentials(_))) => {
                exit_code::INVALID_INPUT
            }
            ResolveError::Selection(SelectionError::Cancelled) => exit_code::CANCELLED,
            ResolveError::Search(_) | ResolveError::Selection(_) => exit_code::FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::TransportError;

    #[test]
    fn test_not_found_distinct_from_failure() {
        let not_found = ResolveError::NoResults {
            query: "x".into(),
        };
        let failed = ResolveError::Search(SearchError::Transport(TransportError::Timeout {
            attempts: 4,
        }));

        assert!(not_found.is_not_found());
        assert!(!failed.is_not_found());
        assert_ne!(not_found.exit_code(), failed.exit_code());
        assert_ne!(not_found.to_string(), failed.to_string());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            ResolveError::Validation(ValidationError::Empty).exit_code(),
            exit_code::INVALID_INPUT
        );
        assert_eq!(
            ResolveError::Config(ConfigError::MissingCredentials("client_id".into())).exit_code(),
            exit_code::INVALID_INPUT
        );
        assert_eq!(
            ResolveError::Selection(SelectionError::Cancelled).exit_code(),
            exit_code::CANCELLED
        );
        assert_eq!(
            ResolveError::Search(SearchError::Auth(AuthError::Rejected {
                status: 401,
                body: String::new()
            }))
            .exit_code(),
            exit_code::FAILURE
        );
    }
}
