use serde::Deserialize;

/// Main configuration structure for Corpus-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// Scraper behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Directory that receives text batches and the images/ subfolder
    #[serde(rename = "output-dir")]
    pub output_dir: String,

    /// Width of the worker pool
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Delay applied before every request, per task, in milliseconds
    #[serde(rename = "rate-limit-delay", default = "default_rate_limit_delay")]
    pub rate_limit_delay: u64,

    /// Pool of user-agent strings; one is chosen at random per attempt
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,

    /// Whether an unreadable robots.txt permits the fetch (fail-open)
    #[serde(rename = "robots-fail-open", default = "default_true")]
    pub robots_fail_open: bool,
}

/// Content validation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Minimum cleaned-text length for a page to be kept
    #[serde(rename = "min-text-length", default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Language tags accepted by validation
    #[serde(rename = "allowed-languages", default = "default_allowed_languages")]
    pub allowed_languages: Vec<String>,

    /// Phrases that reject a page when present, case-insensitively
    #[serde(rename = "blocklist-phrases", default = "default_blocklist_phrases")]
    pub blocklist_phrases: Vec<String>,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Output formats written on every flush ("jsonl", "csv")
    #[serde(rename = "storage-formats", default = "default_storage_formats")]
    pub storage_formats: Vec<String>,

    /// Number of buffered text records that triggers a flush
    #[serde(rename = "max-text-storage", default = "default_max_text_storage")]
    pub max_text_storage: usize,

    /// Whether an image whose file write failed keeps its ledger entry
    #[serde(
        rename = "keep-image-metadata-on-write-failure",
        default = "default_true"
    )]
    pub keep_image_metadata_on_write_failure: bool,
}

/// Retry configuration shared by page and image fetching
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Backoff base in seconds; the delay before attempt N is base^N
    #[serde(rename = "retry-backoff", default = "default_retry_backoff")]
    pub retry_backoff: f64,
}

/// Seed list configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    /// Ordered list of seed URLs, one scrape task each
    #[serde(default)]
    pub seeds: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_text_length: default_min_text_length(),
            allowed_languages: default_allowed_languages(),
            blocklist_phrases: default_blocklist_phrases(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_formats: default_storage_formats(),
            max_text_storage: default_max_text_storage(),
            keep_image_metadata_on_write_failure: true,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_backoff: default_retry_backoff(),
        }
    }
}

fn default_max_workers() -> u32 {
    5
}

fn default_request_timeout() -> u64 {
    15
}

fn default_rate_limit_delay() -> u64 {
    1000
}

fn default_min_text_length() -> usize {
    500
}

fn default_allowed_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_blocklist_phrases() -> Vec<String> {
    vec!["lorem ipsum".to_string(), "test content".to_string()]
}

fn default_storage_formats() -> Vec<String> {
    vec!["jsonl".to_string(), "csv".to_string()]
}

fn default_max_text_storage() -> usize {
    1000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}
