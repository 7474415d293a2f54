use crate::config::types::{Config, FilterConfig, RetryConfig, ScraperConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Known output format names accepted in `storage-formats`
pub const KNOWN_FORMATS: &[&str] = &["jsonl", "csv"];

/// Validates the entire configuration
///
/// Configuration errors are the one fatal error path of a run; they must
/// surface here, before any worker starts.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_filter_config(&config.filters)?;
    validate_storage_config(&config.storage)?;
    validate_retry_config(&config.retry)?;
    validate_seeds(&config.input.seeds)?;
    Ok(())
}

fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    if config.max_workers < 1 || config.max_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and 100, got {}",
            config.max_workers
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout must be >= 1 second, got {}",
            config.request_timeout
        )));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user-agents must contain at least one entry".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user-agents cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.allowed_languages.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-languages must contain at least one language tag".to_string(),
        ));
    }

    if config.blocklist_phrases.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "blocklist-phrases cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.storage_formats.is_empty() {
        return Err(ConfigError::Validation(
            "storage-formats must contain at least one format".to_string(),
        ));
    }

    for format in &config.storage_formats {
        if !KNOWN_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown storage format '{}', expected one of {:?}",
                format, KNOWN_FORMATS
            )));
        }
    }

    if config.max_text_storage < 1 {
        return Err(ConfigError::Validation(format!(
            "max-text-storage must be >= 1, got {}",
            config.max_text_storage
        )));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry-attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    if config.retry_backoff < 0.0 {
        return Err(ConfigError::Validation(format!(
            "retry-backoff cannot be negative, got {}",
            config.retry_backoff
        )));
    }

    Ok(())
}

/// Validates seed URLs: each must parse and use an http(s) scheme
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use an http or https scheme",
                seed
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Seed URL '{}' has no host",
                seed
            )));
        }
    }

    Ok(())
}
