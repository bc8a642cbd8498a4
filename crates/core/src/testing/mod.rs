//! Testing utilities and mock implementations.
//!
//! Every trait seam of the resolution pipeline has a mock here so the whole
//! pipeline can be exercised without network access or a terminal.
//!
//! # Example
//!
//! ```rust,ignore
//! use albumlink_core::testing::{fixtures, MockCatalog, ScriptedPresenter};
//!
//! let catalog = Arc::new(MockCatalog::new());
//! catalog.set_artists(vec![fixtures::artist("id", "The Beatles", 1)]).await;
//!
//! let presenter = ScriptedPresenter::new(vec![PresentChoice::Index(0)]);
//! // Use with Resolver...
//! ```

mod mock_catalog;
mod mock_http_backend;
mod recording_sink;
mod scripted_presenter;

pub use mock_catalog::MockCatalog;
pub use mock_http_backend::MockHttpBackend;
pub use recording_sink::RecordingSink;
pub use scripted_presenter::ScriptedPresenter;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::catalog::CandidateEntity;
    use crate::config::Config;

    /// Path segment of the token endpoint in [`test_config`].
    pub const TOKEN_PATH: &str = "/api/token";

    /// Configuration pointing every endpoint at unroutable test hosts.
    pub fn test_config() -> Config {
        let mut config = Config::default();
        config.credentials.client_id = Some("test-client-id".to_string());
        config.credentials.client_secret = Some("test-client-secret".to_string());
        config.catalog.token_url = format!("https://accounts.test{}", TOKEN_PATH);
        config.catalog.api_base_url = "https://api.test/v1".to_string();
        config.catalog.web_base_url = "https://open.test".to_string();
        config
    }

    /// Token endpoint response body.
    pub fn token_json(access_token: &str, expires_in: u64) -> String {
        json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "expires_in": expires_in,
        })
        .to_string()
    }

    /// An album candidate with a Spotify-style URL.
    pub fn album(id: &str, name: &str, artist: &str, release_date: &str) -> CandidateEntity {
        CandidateEntity::album(id, name, format!("https://open.spotify.com/album/{}", id))
            .with_secondary(artist)
            .with_release_date(release_date)
    }

    /// An artist candidate with a Spotify-style URL.
    pub fn artist(id: &str, name: &str, followers: u64) -> CandidateEntity {
        CandidateEntity::artist(id, name, format!("https://open.spotify.com/artist/{}", id))
            .with_followers(followers)
    }

    /// Wire form of a simplified album object.
    pub fn album_json(id: &str, name: &str, artists: &[&str], release_date: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "album_type": "album",
            "artists": artists.iter().map(|a| json!({ "name": a })).collect::<Vec<_>>(),
            "release_date": release_date,
            "release_date_precision": "day",
            "total_tracks": 10,
            "external_urls": { "spotify": format!("https://open.spotify.com/album/{}", id) },
        })
    }

    /// Wire form of a full artist object.
    pub fn artist_json(id: &str, name: &str, followers: u64, genres: &[&str]) -> Value {
        json!({
            "id": id,
            "name": name,
            "genres": genres,
            "followers": { "href": null, "total": followers },
            "external_urls": { "spotify": format!("https://open.spotify.com/artist/{}", id) },
        })
    }

    fn paging(items: Vec<Value>, total: usize) -> Value {
        json!({
            "items": items,
            "total": total,
            "limit": 50,
            "offset": 0,
        })
    }

    /// Search response body with an `albums` section.
    pub fn album_search_json(items: Vec<Value>, total: usize) -> String {
        json!({ "albums": paging(items, total) }).to_string()
    }

    /// Search response body with an `artists` section.
    pub fn artist_search_json(items: Vec<Value>, total: usize) -> String {
        json!({ "artists": paging(items, total) }).to_string()
    }

    /// Artist albums response body.
    pub fn artist_albums_json(items: Vec<Value>, total: usize) -> String {
        paging(items, total).to_string()
    }
}
