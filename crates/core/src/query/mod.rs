//! Normalizes raw user input into a catalog search query.

mod builder;

pub use builder::QueryBuilder;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("search input is empty")]
    Empty,

    #[error("result limit must be at least 1")]
    ZeroLimit,
}

/// The shapes of input a resolution can start from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryInput {
    /// Explicit `--band` / `--album` flags; either may be absent.
    Structured {
        artist: Option<String>,
        album: Option<String>,
    },
    /// A single query string typed by the user.
    FreeText(String),
    /// Text read from stdin, typically `Artist - Album`.
    Piped(String),
}

impl QueryInput {
    pub fn structured(artist: impl Into<String>, album: impl Into<String>) -> Self {
        Self::Structured {
            artist: Some(artist.into()),
            album: Some(album.into()),
        }
    }
}

/// Immutable search request built once per resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    /// Normalized text the query was built from.
    pub raw_text: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub market: String,
    pub result_limit: usize,
}

impl SearchQuery {
    /// Value of the catalog's `q` parameter.
    pub fn catalog_query(&self) -> String {
        match (&self.artist, &self.album) {
            (Some(artist), Some(album)) => format!("artist:{} album:{}", artist, album),
            (Some(artist), None) => format!("artist:{}", artist),
            (None, Some(album)) => format!("album:{}", album),
            (None, None) => self.raw_text.clone(),
        }
    }

    /// Text to look an artist up by: the artist field when present.
    pub fn artist_text(&self) -> &str {
        self.artist.as_deref().unwrap_or(&self.raw_text)
    }

    pub fn is_structured(&self) -> bool {
        self.artist.is_some() || self.album.is_some()
    }
}
