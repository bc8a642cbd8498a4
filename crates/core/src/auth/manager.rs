use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, CredentialStore};
use crate::http::{HttpRequest, ResilientTransport};

use super::{AuthError, Credentials, FileTokenCache, Token};

/// Upper bound on how early a token is considered expired.
pub const EXPIRY_SAFETY_MARGIN: Duration = Duration::from_secs(30);

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 3600;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Holds at most one cached token and renews it on demand.
///
/// The lock is held across renewal, so concurrent callers observing an
/// expired token wait on a single exchange instead of starting their own.
pub struct TokenManager {
    credentials: Credentials,
    transport: ResilientTransport,
    token_url: String,
    cache: Option<FileTokenCache>,
    current: Mutex<Option<Token>>,
}

impl TokenManager {
    pub fn new(
        credentials: Credentials,
        transport: ResilientTransport,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            transport,
            token_url: token_url.into(),
            cache: None,
            current: Mutex::new(None),
        }
    }

    /// Build a manager from whatever credential source is configured.
    pub fn from_store(
        store: &dyn CredentialStore,
        transport: ResilientTransport,
        token_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(store.load()?, transport, token_url))
    }

    /// Persist tokens between runs.
    pub fn with_cache(mut self, cache: FileTokenCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Return a valid token, exchanging credentials only when needed.
    pub async fn get_token(&self) -> Result<Token, AuthError> {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref() {
            if !token.is_expired() {
                return Ok(token.clone());
            }
            debug!(token = %token.redacted(), "Token expired, renewing");
        } else if let Some(cache) = &self.cache {
            if let Some(token) = cache.load().await {
                debug!(token = %token.redacted(), "Using token from cache");
                *current = Some(token.clone());
                return Ok(token);
            }
        }

        let token = self.exchange().await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&token).await {
                warn!(path = %cache.path().display(), error = %e, "Failed to write token cache");
            }
        }

        *current = Some(token.clone());
        Ok(token)
    }

    /// Drop the held token so the next call performs a fresh exchange.
    pub async fn invalidate(&self) {
        let mut current = self.current.lock().await;
        *current = None;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.clear().await {
                warn!(path = %cache.path().display(), error = %e, "Failed to clear token cache");
            }
        }
    }

    async fn exchange(&self) -> Result<Token, AuthError> {
        if !self.credentials.is_complete() {
            return Err(AuthError::MissingCredentials(
                "client_id and client_secret must both be set".to_string(),
            ));
        }

        let basic = STANDARD.encode(format!(
            "{}:{}",
            self.credentials.client_id(),
            self.credentials.client_secret()
        ));
        let request = HttpRequest::post(&self.token_url)
            .header("Authorization", format!("Basic {}", basic))
            .form([("grant_type", "client_credentials")])
            .timeout(self.transport.default_timeout());

        let issued_at = Utc::now();
        let response: TokenResponse = self.transport.call_json(request).await?;

        let access_token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidResponse("missing access_token".to_string()))?;

        if let Some(kind) = response.token_type.as_deref() {
            if !kind.eq_ignore_ascii_case("bearer") {
                debug!(token_type = kind, "Unexpected token type");
            }
        }

        let ttl = Duration::from_secs(response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN));
        let lifetime = ttl - EXPIRY_SAFETY_MARGIN.min(ttl / 2);
        let expires_at = issued_at
            + chrono::Duration::from_std(lifetime)
                .map_err(|e| AuthError::InvalidResponse(format!("expires_in: {}", e)))?;

        let token = Token::new(access_token, expires_at);
        info!(
            token = %token.redacted(),
            expires_in_secs = ttl.as_secs(),
            "Obtained access token"
        );
        Ok(token)
    }
}
