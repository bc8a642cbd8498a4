use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Environment variable prefix; nested keys are separated by `__`.
const ENV_PREFIX: &str = "ALBUMLINK_";

/// Default location of the configuration file (`<config dir>/albumlink/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("albumlink").join("config.toml"))
}

fn figment_for(path: &Path) -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration from file with environment variable overrides.
///
/// The file must exist.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    figment_for(path)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration, falling back to defaults plus environment when the file is absent.
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults and environment");
    }

    figment_for(path)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[credentials]
client_id = "abc"
client_secret = "def"

[search]
market = "GB"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.credentials.client_id.as_deref(), Some("abc"));
        assert_eq!(config.search.market, "GB");
        assert_eq!(config.http.max_retries, 3);
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert!(config.credentials.client_id.is_none());
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.search.album_limit, 20);
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[http]
timeout_secs = "ten"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/albumlink.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_or_default_missing_file() {
        let config = load_config_or_default(Path::new("/nonexistent/albumlink.toml")).unwrap();
        assert_eq!(config.search.market, "US");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[credentials]
client_id = "file-id"
client_secret = "file-secret"

[http]
timeout_secs = 5
max_retries = 1
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.max_retries, 1);
        // untouched sections keep their defaults
        assert_eq!(config.http.retry_delay_ms, 1000);
        assert_eq!(config.catalog.api_base_url, "https://api.spotify.com/v1");
    }
}
