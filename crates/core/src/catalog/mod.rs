//! Music catalog search.
//!
//! [`CatalogSearch`] is the seam between the resolution pipeline and the
//! remote catalog. [`SpotifyCatalog`] implements it over the Web API, paging
//! through results until the requested number of candidates is collected.

mod pagination;
mod spotify;
mod types;

pub use spotify::SpotifyCatalog;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::AuthError;
use crate::http::TransportError;
use crate::query::SearchQuery;

#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("authorization failed: {0}")]
    Auth(#[from] AuthError),

    #[error("catalog request failed: {0}")]
    Transport(TransportError),

    #[error("unexpected catalog response: {0}")]
    Decode(String),
}

impl From<TransportError> for SearchError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Decode(message) => SearchError::Decode(message),
            other => SearchError::Transport(other),
        }
    }
}

/// Catalog lookups used by the resolver.
///
/// An empty result is not an error.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Albums matching `query`, in catalog relevance order.
    async fn search_albums(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<CandidateEntity>, SearchError>;

    /// Artists matching `query`, in catalog relevance order.
    async fn search_artists(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<CandidateEntity>, SearchError>;

    /// Albums released by one artist.
    async fn get_artist_albums(
        &self,
        artist_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidateEntity>, SearchError>;
}
