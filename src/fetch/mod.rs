//! HTTP fetching with header rotation, rate limiting, and bounded retry
//!
//! This module owns all outbound HTTP for the scraper:
//! - Building the shared HTTP client
//! - Per-task rate-limit delay before each request
//! - Random user-agent selection per attempt
//! - Exponential backoff retry for transient failures

use crate::config::{RetryConfig, ScraperConfig};
use crate::HarvestError;
use rand::seq::SliceRandom;
use reqwest::Client;
use std::time::Duration;

/// Fixed Accept-Language header attached to every request
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// HTTP status codes that warrant a retry
const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Shared, read-only retry configuration
///
/// Applied identically by page fetching and image acquisition. Kept as an
/// explicit value so tests can substitute a policy with zero backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of attempts per request (not additional retries)
    pub max_attempts: u32,

    /// Backoff base in seconds; the delay after failed attempt N is base^N
    pub backoff_base: f64,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts,
            backoff_base: config.retry_backoff,
        }
    }

    /// Returns whether an HTTP status code warrants another attempt
    pub fn is_retryable_status(status: u16) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }

    /// Backoff delay before retrying after failed attempt `attempt` (1-based)
    ///
    /// Exponential, no jitter: `base^attempt` seconds.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        Duration::from_secs_f64(self.backoff_base.powi(attempt as i32).max(0.0))
    }
}

/// A successfully fetched HTTP response
#[derive(Debug)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, if present
    pub content_type: Option<String>,

    /// Response body
    pub body: String,
}

/// HTTP client with the scraper's per-request policy baked in
///
/// One instance is shared read-only across all workers; the underlying
/// `reqwest::Client` pools connections internally.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    user_agents: Vec<String>,
    rate_limit_delay: Duration,
    retry: RetryPolicy,
}

/// Builds the shared HTTP client
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

impl FetchClient {
    /// Creates a fetch client from the scraper and retry configuration
    pub fn new(scraper: &ScraperConfig, retry: &RetryConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(Duration::from_secs(scraper.request_timeout))?;
        Ok(Self::with_parts(
            client,
            scraper.user_agents.clone(),
            Duration::from_millis(scraper.rate_limit_delay),
            RetryPolicy::from_config(retry),
        ))
    }

    /// Assembles a fetch client from explicit parts
    ///
    /// Tests use this to substitute a zero-delay rate limiter and a cheap
    /// backoff policy.
    pub fn with_parts(
        client: Client,
        user_agents: Vec<String>,
        rate_limit_delay: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            user_agents,
            rate_limit_delay,
            retry,
        }
    }

    /// The retry policy in effect, shared with image acquisition
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// The underlying HTTP client, shared with the robots.txt gate
    ///
    /// `reqwest::Client` is a handle to one connection pool; cloning it does
    /// not create a second pool.
    pub fn http_client(&self) -> Client {
        self.client.clone()
    }

    /// Picks a user agent uniformly at random from the configured pool
    fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or("corpus-harvester/1.0")
    }

    /// Fetches a URL as text, retrying transient failures
    ///
    /// # Request Flow
    ///
    /// 1. Sleep the fixed rate-limit delay (per task, not globally serialized)
    /// 2. Attempt loop, up to `max_attempts` total attempts:
    ///    - attach a random user agent and the fixed Accept-Language
    ///    - network errors and HTTP {429,500,502,503,504} retry after
    ///      `backoff_base^attempt` seconds
    ///    - any other non-success status fails immediately
    /// 3. Exhausted attempts surface as one aggregated `HarvestError::Fetch`
    pub async fn fetch_text(&self, url: &str) -> Result<FetchedPage, HarvestError> {
        let response = self.get_with_retry(url).await?;

        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await.map_err(|e| HarvestError::Fetch {
            url: url.to_string(),
            message: format!("failed to read body: {}", e),
        })?;

        Ok(FetchedPage {
            final_url,
            status,
            content_type,
            body,
        })
    }

    /// Fetches a URL as raw bytes, retrying transient failures
    ///
    /// Used for image acquisition; same timeout and retry policy as pages.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, HarvestError> {
        let response = self.get_with_retry(url).await?;
        let bytes = response.bytes().await.map_err(|e| HarvestError::Fetch {
            url: url.to_string(),
            message: format!("failed to read body: {}", e),
        })?;
        Ok(bytes.to_vec())
    }

    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response, HarvestError> {
        // Rate limiting, applied immediately before issuing the request
        if !self.rate_limit_delay.is_zero() {
            tokio::time::sleep(self.rate_limit_delay).await;
        }

        let mut last_failure = String::new();

        for attempt in 1..=self.retry.max_attempts {
            let result = self
                .client
                .get(url)
                .header("User-Agent", self.pick_user_agent())
                .header("Accept-Language", ACCEPT_LANGUAGE)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    if RetryPolicy::is_retryable_status(status.as_u16()) {
                        last_failure = format!("HTTP {}", status.as_u16());
                        tracing::warn!(
                            "Attempt {}/{} for {} failed: {}",
                            attempt,
                            self.retry.max_attempts,
                            url,
                            last_failure
                        );
                    } else {
                        // Non-retryable status, e.g. 404: fail immediately
                        return Err(HarvestError::Fetch {
                            url: url.to_string(),
                            message: format!("HTTP {}", status.as_u16()),
                        });
                    }
                }
                Err(e) => {
                    last_failure = if e.is_timeout() {
                        "request timeout".to_string()
                    } else {
                        e.to_string()
                    };
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        self.retry.max_attempts,
                        url,
                        last_failure
                    );
                }
            }

            if attempt < self.retry.max_attempts {
                tokio::time::sleep(self.retry.backoff_delay(attempt)).await;
            }
        }

        Err(HarvestError::Fetch {
            url: url.to_string(),
            message: format!(
                "exhausted {} attempts, last failure: {}",
                self.retry.max_attempts, last_failure
            ),
        })
    }
}
