//! Corpus-Harvester: a training-data web scraper
//!
//! This crate fetches a fixed seed list of pages concurrently, extracts and
//! filters their textual content, opportunistically downloads embedded images,
//! and persists both as batched, format-flexible datasets.

pub mod config;
pub mod fetch;
pub mod images;
pub mod pipeline;
pub mod policy;
pub mod scrape;
pub mod storage;

use thiserror::Error;

/// Main error type for Corpus-Harvester operations
///
/// Per-task and per-image errors are caught at their origin and logged;
/// nothing here ever aborts the worker pool or the run. The only fatal path
/// is a configuration error raised before any worker starts.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Image error for {url}: {message}")]
    Image { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Corpus-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Extracts the lowercase host (with any explicit port) of a URL string
///
/// Returns None for URLs without a host (e.g. `mailto:` or malformed input).
/// The port is kept because it is part of the scraping authority: robots.txt
/// lookup and per-domain grouping both need `host:port` to stay distinct
/// from `host`.
///
/// # Examples
///
/// ```
/// use corpus_harvester::extract_domain;
///
/// assert_eq!(
///     extract_domain("https://Example.COM/path"),
///     Some("example.com".to_string())
/// );
/// assert_eq!(
///     extract_domain("http://example.com:8080/path"),
///     Some("example.com:8080".to_string())
/// );
/// assert_eq!(extract_domain("not a url"), None);
/// ```
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

// Re-export commonly used types
pub use config::Config;
pub use fetch::{FetchClient, RetryPolicy};
pub use scrape::{run_scrape, RunSummary};
pub use storage::{ImageRecord, StorageManager, TextRecord};
