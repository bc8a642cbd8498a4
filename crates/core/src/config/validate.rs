use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - HTTP timeout and backoff are usable
/// - Fetch limits are at least 1
/// - Endpoint URLs are not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.http.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "http.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.http.backoff_multiplier < 1.0 || !config.http.backoff_multiplier.is_finite() {
        return Err(ConfigError::ValidationError(format!(
            "http.backoff_multiplier must be >= 1.0, got {}",
            config.http.backoff_multiplier
        )));
    }

    if config.http.overall_deadline_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "http.overall_deadline_secs cannot be 0".to_string(),
        ));
    }

    for (name, value) in [
        ("search.album_limit", config.search.album_limit),
        ("search.artist_limit", config.search.artist_limit),
        ("search.artist_album_limit", config.search.artist_album_limit),
    ] {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!("{} cannot be 0", name)));
        }
    }

    if config.search.display_limit == 0 {
        return Err(ConfigError::ValidationError(
            "search.display_limit cannot be 0".to_string(),
        ));
    }

    if config.search.market.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "search.market cannot be empty".to_string(),
        ));
    }

    for (name, url) in [
        ("catalog.token_url", &config.catalog.token_url),
        ("catalog.api_base_url", &config.catalog.api_base_url),
        ("catalog.web_base_url", &config.catalog.web_base_url),
    ] {
        if url.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_timeout_zero_fails() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_backoff_below_one_fails() {
        let mut config = Config::default();
        config.http.backoff_multiplier = 0.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_limit_fails() {
        let mut config = Config::default();
        config.search.artist_album_limit = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("search.artist_album_limit"));
    }

    #[test]
    fn test_validate_empty_endpoint_fails() {
        let mut config = Config::default();
        config.catalog.token_url = " ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
