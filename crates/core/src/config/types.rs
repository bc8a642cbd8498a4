use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub token_cache: TokenCacheConfig,
}

/// Catalog API client credentials (client-credentials flow).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// HTTP transport tunables.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Retries after the first attempt for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Multiplier applied to the delay for each further retry.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Upper bound for a single retry delay in milliseconds.
    #[serde(default = "default_max_retry_delay")]
    pub max_retry_delay_ms: u64,
    /// Optional deadline shared by all attempts of one call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_deadline_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            max_retry_delay_ms: default_max_retry_delay(),
            overall_deadline_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_retry_delay() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    format!("albumlink/{}", env!("CARGO_PKG_VERSION"))
}

/// Search and ranking tunables.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Market (ISO 3166-1 alpha-2) passed to every catalog call.
    #[serde(default = "default_market")]
    pub market: String,
    #[serde(default = "default_album_limit")]
    pub album_limit: u32,
    #[serde(default = "default_artist_limit")]
    pub artist_limit: u32,
    #[serde(default = "default_artist_album_limit")]
    pub artist_album_limit: u32,
    /// How many ranked candidates are shown after an artist album listing.
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
    /// Album group filter for artist album listings.
    #[serde(default = "default_include_groups")]
    pub include_groups: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            market: default_market(),
            album_limit: default_album_limit(),
            artist_limit: default_artist_limit(),
            artist_album_limit: default_artist_album_limit(),
            display_limit: default_display_limit(),
            include_groups: default_include_groups(),
        }
    }
}

fn default_market() -> String {
    "US".to_string()
}

fn default_album_limit() -> u32 {
    20
}

fn default_artist_limit() -> u32 {
    20
}

fn default_artist_album_limit() -> u32 {
    50
}

fn default_display_limit() -> usize {
    50
}

fn default_include_groups() -> Vec<String> {
    vec!["album".to_string()]
}

/// Catalog API endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base for canonical links when the API omits them.
    #[serde(default = "default_web_base_url")]
    pub web_base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            web_base_url: default_web_base_url(),
        }
    }
}

fn default_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_web_base_url() -> String {
    "https://open.spotify.com".to_string()
}

/// Ephemeral on-disk token cache.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokenCacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl TokenCacheConfig {
    /// Resolved cache path, if caching is enabled.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        self.path
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("albumlink").join("token.json")))
    }
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub credentials: SanitizedCredentialsConfig,
    pub http: HttpConfig,
    pub search: SearchConfig,
    pub catalog: CatalogConfig,
    pub token_cache: TokenCacheConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCredentialsConfig {
    pub client_id_configured: bool,
    pub client_secret_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let configured =
            |v: &Option<String>| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
        Self {
            credentials: SanitizedCredentialsConfig {
                client_id_configured: configured(&config.credentials.client_id),
                client_secret_configured: configured(&config.credentials.client_secret),
            },
            http: config.http.clone(),
            search: config.search.clone(),
            catalog: config.catalog.clone(),
            token_cache: config.token_cache.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[credentials]
client_id = "id"
client_secret = "secret"

[http]
timeout_secs = 3
max_retries = 5
overall_deadline_secs = 20

[search]
market = "DE"
include_groups = ["album", "single"]

[token_cache]
enabled = true
path = "/tmp/albumlink-token.json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.http.timeout(), Duration::from_secs(3));
        assert_eq!(config.http.max_retries, 5);
        assert_eq!(config.http.overall_deadline_secs, Some(20));
        assert_eq!(config.search.market, "DE");
        assert_eq!(config.search.include_groups, vec!["album", "single"]);
        assert_eq!(
            config.token_cache.resolved_path(),
            Some(PathBuf::from("/tmp/albumlink-token.json"))
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http.backoff_multiplier, 2.0);
        assert_eq!(config.search.artist_album_limit, 50);
        assert_eq!(config.catalog.web_base_url, "https://open.spotify.com");
        assert!(config.http.user_agent.starts_with("albumlink/"));
    }

    #[test]
    fn test_token_cache_disabled_has_no_path() {
        let cache = TokenCacheConfig {
            enabled: false,
            path: Some(PathBuf::from("/tmp/x.json")),
        };
        assert!(cache.resolved_path().is_none());
    }

    #[test]
    fn test_sanitized_config_hides_secret() {
        let mut config = Config::default();
        config.credentials.client_id = Some("id".to_string());
        config.credentials.client_secret = Some("   ".to_string());

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.credentials.client_id_configured);
        assert!(!sanitized.credentials.client_secret_configured);

        let rendered = toml::to_string(&sanitized).unwrap();
        assert!(!rendered.contains("client_secret ="));
    }
}
