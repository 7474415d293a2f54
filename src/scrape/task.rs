//! Task vocabulary for the worker pool

use crate::pipeline::Rejection;

/// One seed URL bound to its scraping authority
#[derive(Debug, Clone)]
pub struct ScrapeTask {
    pub url: String,
    pub domain: String,
}

impl ScrapeTask {
    /// Builds a task from a seed URL
    ///
    /// Returns None for URLs without a host; those can never pass the
    /// robots gate and are rejected before a worker is spent on them.
    pub fn from_seed(url: &str) -> Option<Self> {
        crate::extract_domain(url).map(|domain| Self {
            url: url.to_string(),
            domain,
        })
    }
}

/// Terminal state of one finished task
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// Cleaned text passed validation and entered the storage buffer
    Stored,

    /// Page fetched and cleaned, but validation rejected it
    Rejected(Rejection),

    /// robots.txt disallowed the fetch
    SkippedByPolicy,

    /// Fetch failed; the reason was logged where it happened
    Failed(String),
}

/// Per-task result handed back to the orchestrator for aggregation
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub url: String,
    pub outcome: TaskOutcome,
    pub images_found: usize,
    pub images_acquired: usize,
}

impl TaskReport {
    /// Report for a task that ended before any image work happened
    pub fn without_images(url: String, outcome: TaskOutcome) -> Self {
        Self {
            url,
            outcome,
            images_found: 0,
            images_acquired: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seed_extracts_domain() {
        let task = ScrapeTask::from_seed("https://Example.com/articles/1").unwrap();
        assert_eq!(task.domain, "example.com");
        assert_eq!(task.url, "https://Example.com/articles/1");
    }

    #[test]
    fn test_from_seed_keeps_port() {
        let task = ScrapeTask::from_seed("http://127.0.0.1:8080/page").unwrap();
        assert_eq!(task.domain, "127.0.0.1:8080");
    }

    #[test]
    fn test_from_seed_rejects_hostless_url() {
        assert!(ScrapeTask::from_seed("not a url").is_none());
        assert!(ScrapeTask::from_seed("mailto:someone@example.com").is_none());
    }
}
