//! Mock catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{CandidateEntity, CatalogSearch, SearchError};
use crate::query::SearchQuery;

/// Mock implementation of the CatalogSearch trait.
///
/// Returns configured candidates (truncated to the requested limit) and
/// records every call for assertions.
///
/// # Example
///
/// ```rust,ignore
/// use albumlink_core::testing::{MockCatalog, fixtures};
///
/// let catalog = Arc::new(MockCatalog::new());
/// catalog
///     .set_albums(vec![fixtures::album("id", "Abbey Road", "The Beatles", "1969-09-26")])
///     .await;
///
/// let resolver = Resolver::new(catalog.clone(), ResolverSettings::default());
/// ```
#[derive(Debug, Default)]
pub struct MockCatalog {
    albums: Arc<RwLock<Vec<CandidateEntity>>>,
    artists: Arc<RwLock<Vec<CandidateEntity>>>,
    artist_albums: Arc<RwLock<HashMap<String, Vec<CandidateEntity>>>>,
    album_searches: Arc<RwLock<Vec<SearchQuery>>>,
    artist_searches: Arc<RwLock<Vec<SearchQuery>>>,
    artist_album_requests: Arc<RwLock<Vec<(String, usize)>>>,
    /// If set, the next call fails with this error.
    next_error: Arc<RwLock<Option<SearchError>>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_albums(&self, albums: Vec<CandidateEntity>) {
        *self.albums.write().await = albums;
    }

    pub async fn set_artists(&self, artists: Vec<CandidateEntity>) {
        *self.artists.write().await = artists;
    }

    pub async fn set_artist_albums(&self, artist_id: &str, albums: Vec<CandidateEntity>) {
        self.artist_albums
            .write()
            .await
            .insert(artist_id.to_string(), albums);
    }

    pub async fn set_next_error(&self, error: SearchError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn album_searches(&self) -> Vec<SearchQuery> {
        self.album_searches.read().await.clone()
    }

    pub async fn artist_searches(&self) -> Vec<SearchQuery> {
        self.artist_searches.read().await.clone()
    }

    /// `(artist_id, limit)` for every album listing.
    pub async fn artist_album_requests(&self) -> Vec<(String, usize)> {
        self.artist_album_requests.read().await.clone()
    }

    async fn take_error(&self) -> Result<(), SearchError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn limited(items: &[CandidateEntity], limit: usize) -> Vec<CandidateEntity> {
    items.iter().take(limit).cloned().collect()
}

#[async_trait]
impl CatalogSearch for MockCatalog {
    async fn search_albums(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<CandidateEntity>, SearchError> {
        self.album_searches.write().await.push(query.clone());
        self.take_error().await?;
        Ok(limited(&self.albums.read().await, limit))
    }

    async fn search_artists(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<CandidateEntity>, SearchError> {
        self.artist_searches.write().await.push(query.clone());
        self.take_error().await?;
        Ok(limited(&self.artists.read().await, limit))
    }

    async fn get_artist_albums(
        &self,
        artist_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidateEntity>, SearchError> {
        self.artist_album_requests
            .write()
            .await
            .push((artist_id.to_string(), limit));
        self.take_error().await?;
        Ok(self
            .artist_albums
            .read()
            .await
            .get(artist_id)
            .map(|albums| limited(albums, limit))
            .unwrap_or_default())
    }
}
