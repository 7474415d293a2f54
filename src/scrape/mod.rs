//! Run orchestration
//!
//! `run_scrape` drives the whole pipeline: it assembles the shared
//! collaborators once, fans the seed list out over a bounded worker pool,
//! and aggregates per-task reports into a run summary. A task failure is a
//! logged data point, never a reason to stop the run; the only fatal errors
//! are the setup ones raised before any worker starts.

mod task;

pub use task::{ScrapeTask, TaskOutcome, TaskReport};

use crate::config::{Config, FilterConfig};
use crate::fetch::FetchClient;
use crate::images::ImageAcquirer;
use crate::pipeline::{clean_text, parse_page, validate_text};
use crate::policy::PolicyGate;
use crate::storage::{StorageManager, TextRecord};
use crate::HarvestError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Aggregated counts for one completed run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Seed URLs taken on, including ones rejected before spawning
    pub tasks: usize,
    pub stored: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub failed: usize,
    pub images_found: usize,
    pub images_acquired: usize,
}

impl RunSummary {
    fn absorb(&mut self, report: &TaskReport) {
        self.tasks += 1;
        self.images_found += report.images_found;
        self.images_acquired += report.images_acquired;
        match &report.outcome {
            TaskOutcome::Stored => self.stored += 1,
            TaskOutcome::Rejected(_) => self.rejected += 1,
            TaskOutcome::SkippedByPolicy => self.skipped += 1,
            TaskOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Scrapes every configured seed URL and returns the run summary
///
/// Concurrency is bounded by `max-workers`; each seed becomes one task that
/// runs the robots check, fetch, content pipeline, and image acquisition in
/// sequence. Buffered text is flushed once more after the pool drains.
pub async fn run_scrape(config: &Config) -> Result<RunSummary, HarvestError> {
    let fetch = FetchClient::new(&config.scraper, &config.retry)?;
    let policy = Arc::new(PolicyGate::new(
        fetch.http_client(),
        config.scraper.robots_fail_open,
    ));
    let storage = Arc::new(StorageManager::new(
        Path::new(&config.scraper.output_dir),
        &config.storage.storage_formats,
        config.storage.max_text_storage,
        config.storage.keep_image_metadata_on_write_failure,
    )?);

    let semaphore = Arc::new(Semaphore::new(config.scraper.max_workers.max(1) as usize));
    let mut pool: JoinSet<TaskReport> = JoinSet::new();
    let mut summary = RunSummary::default();

    tracing::info!(
        "Starting scrape of {} seeds with {} workers",
        config.input.seeds.len(),
        config.scraper.max_workers
    );

    for seed in &config.input.seeds {
        let Some(task) = ScrapeTask::from_seed(seed) else {
            tracing::error!("Skipping seed without a host: {}", seed);
            summary.tasks += 1;
            summary.failed += 1;
            continue;
        };

        let semaphore = semaphore.clone();
        let fetch = fetch.clone();
        let policy = policy.clone();
        let storage = storage.clone();
        let filters = config.filters.clone();

        pool.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return TaskReport::without_images(
                        task.url,
                        TaskOutcome::Failed("worker pool closed".to_string()),
                    )
                }
            };
            run_task(task, fetch, policy, storage, filters).await
        });
    }

    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(report) => summary.absorb(&report),
            Err(e) => {
                tracing::error!("Worker task panicked: {}", e);
                summary.tasks += 1;
                summary.failed += 1;
            }
        }
    }

    // Remainder below the batch threshold
    if let Err(e) = storage.flush_text().await {
        tracing::error!("Final flush failed: {}", e);
    }

    tracing::info!(
        "Run complete: {} tasks, {} stored, {} rejected, {} skipped, {} failed, {}/{} images acquired",
        summary.tasks,
        summary.stored,
        summary.rejected,
        summary.skipped,
        summary.failed,
        summary.images_acquired,
        summary.images_found
    );

    Ok(summary)
}

/// Runs one seed through robots check, fetch, pipeline, and image acquisition
async fn run_task(
    task: ScrapeTask,
    fetch: FetchClient,
    policy: Arc<PolicyGate>,
    storage: Arc<StorageManager>,
    filters: FilterConfig,
) -> TaskReport {
    tracing::info!("Scraping {}", task.url);

    if !policy.permitted(&task.domain, &task.url).await {
        tracing::info!("Skipping {} (disallowed by robots.txt)", task.url);
        return TaskReport::without_images(task.url, TaskOutcome::SkippedByPolicy);
    }

    let page = match fetch.fetch_text(&task.url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!("Error scraping {}: {}", task.url, e);
            return TaskReport::without_images(task.url, TaskOutcome::Failed(e.to_string()));
        }
    };

    if let Some(content_type) = &page.content_type {
        if !content_type.contains("html") {
            tracing::debug!("Unexpected content type for {}: {}", task.url, content_type);
        }
    }

    let content = parse_page(&page.body);
    let cleaned = clean_text(&content.raw_text);

    let outcome = match validate_text(&cleaned, &filters) {
        Ok(()) => {
            let record = TextRecord::new(task.url.clone(), cleaned, task.domain.clone());
            // The record is in the buffer even if a threshold flush failed;
            // the flush error is logged at its origin
            if let Err(e) = storage.store_text(record).await {
                tracing::error!("Storage flush failed after {}: {}", task.url, e);
            }
            tracing::info!("Stored text from {}", task.url);
            TaskOutcome::Stored
        }
        Err(rejection) => {
            tracing::info!("Rejected {}: {}", task.url, rejection);
            TaskOutcome::Rejected(rejection)
        }
    };

    // Image acquisition runs regardless of the text outcome
    let images_found = content.image_urls.len();
    let acquirer = ImageAcquirer::new(fetch, storage);
    let images_acquired = acquirer.acquire_all(&content.image_urls, &task.domain).await;

    TaskReport {
        url: task.url,
        outcome,
        images_found,
        images_acquired,
    }
}
