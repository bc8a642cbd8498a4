//! Ephemeral on-disk token cache.
//!
//! Lets consecutive CLI invocations reuse a still-valid token instead of
//! performing a new exchange each time. Any problem reading the cache is
//! treated as a miss.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::Token;

#[derive(Debug, Clone)]
pub struct FileTokenCache {
    path: PathBuf,
}

impl FileTokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a token that is still valid, if any.
    pub async fn load(&self) -> Option<Token> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Token cache miss");
                return None;
            }
        };

        match serde_json::from_str::<Token>(&raw) {
            Ok(token) if !token.is_expired() => Some(token),
            Ok(_) => {
                debug!(path = %self.path.display(), "Cached token expired");
                None
            }
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Ignoring corrupt token cache");
                None
            }
        }
    }

    /// Persist a token, readable only by the current user.
    pub async fn store(&self, token: &Token) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string(token).map_err(io::Error::other)?;
        tokio::fs::write(&self.path, raw).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await?;
        }

        Ok(())
    }

    /// Remove the cache file; a missing file is not an error.
    pub async fn clear(&self) -> io::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_then_load() {
        let dir = TempDir::new().unwrap();
        let cache = FileTokenCache::new(dir.path().join("nested").join("token.json"));
        let token = Token::new("cached-token", Utc::now() + Duration::minutes(30));

        cache.store(&token).await.unwrap();
        assert_eq!(cache.load().await, Some(token));
    }

    #[tokio::test]
    async fn test_expired_token_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = FileTokenCache::new(dir.path().join("token.json"));
        cache
            .store(&Token::new("old", Utc::now() - Duration::seconds(1)))
            .await
            .unwrap();

        assert!(cache.load().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(FileTokenCache::new(path).load().await.is_none());
    }

    #[tokio::test]
    async fn test_clear_missing_file_ok() {
        let dir = TempDir::new().unwrap();
        let cache = FileTokenCache::new(dir.path().join("absent.json"));
        assert!(cache.clear().await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cache_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let cache = FileTokenCache::new(dir.path().join("token.json"));
        cache
            .store(&Token::new("t", Utc::now() + Duration::minutes(5)))
            .await
            .unwrap();

        let mode = std::fs::metadata(cache.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
