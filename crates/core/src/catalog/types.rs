//! Candidate entities returned by catalog searches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a candidate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Album,
    Artist,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Album => "album",
            EntityKind::Artist => "artist",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One search result eligible for selection.
///
/// `id` is unique within one search session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEntity {
    /// Catalog id.
    pub id: String,
    /// Album or artist name.
    pub display_name: String,
    /// Album artists (for albums) or leading genres (for artists).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_name: Option<String>,
    /// Public web link.
    pub canonical_url: String,
    /// As reported by the catalog (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tracks: Option<u32>,
}

impl CandidateEntity {
    pub fn album(
        id: impl Into<String>,
        name: impl Into<String>,
        canonical_url: impl Into<String>,
    ) -> Self {
        Self::new(EntityKind::Album, id, name, canonical_url)
    }

    pub fn artist(
        id: impl Into<String>,
        name: impl Into<String>,
        canonical_url: impl Into<String>,
    ) -> Self {
        Self::new(EntityKind::Artist, id, name, canonical_url)
    }

    fn new(
        kind: EntityKind,
        id: impl Into<String>,
        name: impl Into<String>,
        canonical_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: name.into(),
            secondary_name: None,
            canonical_url: canonical_url.into(),
            release_date: None,
            kind,
            followers: None,
            genres: Vec::new(),
            total_tracks: None,
        }
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary_name = Some(secondary.into());
        self
    }

    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = Some(date.into());
        self
    }

    pub fn with_followers(mut self, followers: u64) -> Self {
        self.followers = Some(followers);
        self
    }

    pub fn with_genres(mut self, genres: Vec<String>) -> Self {
        self.genres = genres;
        self
    }

    /// Release year, when the date starts with four digits.
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }

    /// One-line human description used by pickers and plain listings.
    pub fn summary(&self) -> String {
        match self.kind {
            EntityKind::Album => {
                let mut line = self.display_name.clone();
                if let Some(artists) = &self.secondary_name {
                    line.push_str(" — ");
                    line.push_str(artists);
                }
                line.push_str(&format!(" ({})", self.release_year().unwrap_or("?")));
                line
            }
            EntityKind::Artist => {
                let mut details = Vec::new();
                if let Some(followers) = self.followers.filter(|f| *f > 0) {
                    details.push(format!("{} followers", compact_count(followers)));
                }
                if let Some(genres) = &self.secondary_name {
                    details.push(genres.clone());
                }
                if details.is_empty() {
                    self.display_name.clone()
                } else {
                    format!("{} ({})", self.display_name, details.join(", "))
                }
            }
        }
    }
}

/// `1234567` -> `1.2M`, `5300` -> `5.3K`.
fn compact_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
