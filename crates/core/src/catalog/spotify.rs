//! Spotify Web API catalog client.
//!
//! Uses the search endpoint for albums and artists and the artist albums
//! listing for artist -> album chains. Every page request carries a bearer
//! token from the shared [`TokenManager`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::TokenManager;
use crate::config::{CatalogConfig, SearchConfig};
use crate::http::{HttpRequest, ResilientTransport};
use crate::query::SearchQuery;

use super::pagination::{collect_pages, Page};
use super::{CandidateEntity, CatalogSearch, EntityKind, SearchError};

/// Search refuses `offset + limit` beyond this.
const SEARCH_MAX_REACH: usize = 1000;

/// Genres shown next to an artist name.
const ARTIST_GENRES_SHOWN: usize = 3;

pub struct SpotifyCatalog {
    tokens: Arc<TokenManager>,
    transport: ResilientTransport,
    api_base_url: String,
    web_base_url: String,
    market: String,
    include_groups: Vec<String>,
}

impl SpotifyCatalog {
    pub fn new(
        tokens: Arc<TokenManager>,
        transport: ResilientTransport,
        catalog: &CatalogConfig,
        search: &SearchConfig,
    ) -> Self {
        Self {
            tokens,
            transport,
            api_base_url: catalog.api_base_url.trim_end_matches('/').to_string(),
            web_base_url: catalog.web_base_url.trim_end_matches('/').to_string(),
            market: search.market.clone(),
            include_groups: search.include_groups.clone(),
        }
    }

    /// Market used for artist album listings.
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    async fn authorized_get(&self, request: HttpRequest) -> Result<HttpRequest, SearchError> {
        let token = self.tokens.get_token().await?;
        Ok(request
            .header("Authorization", token.bearer())
            .timeout(self.transport.default_timeout()))
    }

    async fn search_page(
        &self,
        query: &SearchQuery,
        kind: EntityKind,
        offset: usize,
        limit: usize,
    ) -> Result<Page<CandidateEntity>, SearchError> {
        // Artist lookups search by name, without field qualifiers.
        let q = match kind {
            EntityKind::Album => query.catalog_query(),
            EntityKind::Artist => query.artist_text().to_string(),
        };
        let request = HttpRequest::get(format!("{}/search", self.api_base_url))
            .query("q", q.as_str())
            .query("type", kind.as_str())
            .query("market", &query.market)
            .query("limit", limit.to_string())
            .query("offset", offset.to_string());
        let request = self.authorized_get(request).await?;

        debug!(q = %q, kind = %kind, offset, limit, "Catalog search");

        let response: SpSearchResponse = self.transport.call_json(request).await?;
        let page = match kind {
            EntityKind::Album => response.albums.map(|p| self.map_page(p, |a| self.album(a))),
            EntityKind::Artist => response.artists.map(|p| self.map_page(p, |a| self.artist(a))),
        };

        page.ok_or_else(|| SearchError::Decode(format!("response has no {}s section", kind)))
    }

    async fn artist_albums_page(
        &self,
        artist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page<CandidateEntity>, SearchError> {
        let url = format!(
            "{}/artists/{}/albums",
            self.api_base_url,
            urlencoding::encode(artist_id)
        );
        let request = HttpRequest::get(url)
            .query("include_groups", self.include_groups.join(","))
            .query("market", &self.market)
            .query("limit", limit.to_string())
            .query("offset", offset.to_string());
        let request = self.authorized_get(request).await?;

        debug!(artist_id, offset, limit, "Listing artist albums");

        let page: SpPage<SpAlbum> = self.transport.call_json(request).await?;
        Ok(self.map_page(page, |a| self.album(a)))
    }

    fn map_page<T>(
        &self,
        page: SpPage<T>,
        map: impl Fn(T) -> Option<CandidateEntity>,
    ) -> Page<CandidateEntity> {
        let raw_len = page.items.len();
        Page {
            total: page.total,
            raw_len,
            items: page.items.into_iter().flatten().filter_map(map).collect(),
        }
    }

    fn album(&self, album: SpAlbum) -> Option<CandidateEntity> {
        let Some(id) = album.id.filter(|id| !id.is_empty()) else {
            warn!(name = %album.name, "Dropping album without id");
            return None;
        };

        let canonical_url = album
            .external_urls
            .and_then(|u| u.spotify)
            .unwrap_or_else(|| format!("{}/album/{}", self.web_base_url, id));
        let artists = album
            .artists
            .into_iter()
            .map(|a| a.name)
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Some(CandidateEntity {
            id,
            display_name: album.name,
            secondary_name: Some(artists).filter(|a| !a.is_empty()),
            canonical_url,
            release_date: album.release_date.filter(|d| !d.is_empty()),
            kind: EntityKind::Album,
            followers: None,
            genres: Vec::new(),
            total_tracks: album.total_tracks,
        })
    }

    fn artist(&self, artist: SpArtist) -> Option<CandidateEntity> {
        let Some(id) = artist.id.filter(|id| !id.is_empty()) else {
            warn!(name = %artist.name, "Dropping artist without id");
            return None;
        };

        let canonical_url = artist
            .external_urls
            .and_then(|u| u.spotify)
            .unwrap_or_else(|| format!("{}/artist/{}", self.web_base_url, id));
        let top_genres = artist
            .genres
            .iter()
            .take(ARTIST_GENRES_SHOWN)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");

        Some(CandidateEntity {
            id,
            display_name: artist.name,
            secondary_name: Some(top_genres).filter(|g| !g.is_empty()),
            canonical_url,
            release_date: None,
            kind: EntityKind::Artist,
            followers: artist.followers.and_then(|f| f.total),
            genres: artist.genres,
            total_tracks: None,
        })
    }
}

#[async_trait]
impl CatalogSearch for SpotifyCatalog {
    async fn search_albums(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<CandidateEntity>, SearchError> {
        collect_pages(limit, Some(SEARCH_MAX_REACH), |offset, size| {
            self.search_page(query, EntityKind::Album, offset, size)
        })
        .await
    }

    async fn search_artists(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<CandidateEntity>, SearchError> {
        collect_pages(limit, Some(SEARCH_MAX_REACH), |offset, size| {
            self.search_page(query, EntityKind::Artist, offset, size)
        })
        .await
    }

    async fn get_artist_albums(
        &self,
        artist_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidateEntity>, SearchError> {
        collect_pages(limit, None, |offset, size| {
            self.artist_albums_page(artist_id, offset, size)
        })
        .await
    }
}

// ============================================================================
// Spotify API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SpSearchResponse {
    #[serde(default)]
    albums: Option<SpPage<SpAlbum>>,
    #[serde(default)]
    artists: Option<SpPage<SpArtist>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct SpPage<T> {
    /// The API occasionally returns `null` entries.
    #[serde(default)]
    items: Vec<Option<T>>,
    #[serde(default)]
    total: usize,
}

#[derive(Debug, Deserialize)]
struct SpAlbum {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    artists: Vec<SpArtistRef>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    total_tracks: Option<u32>,
    #[serde(default)]
    external_urls: Option<SpExternalUrls>,
}

#[derive(Debug, Deserialize)]
struct SpArtistRef {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpArtist {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    followers: Option<SpFollowers>,
    #[serde(default)]
    external_urls: Option<SpExternalUrls>,
}

#[derive(Debug, Deserialize)]
struct SpFollowers {
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SpExternalUrls {
    #[serde(default)]
    spotify: Option<String>,
}
