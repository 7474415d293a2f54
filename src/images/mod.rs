//! Opportunistic image acquisition
//!
//! Candidate image URLs are fetched with the same timeout and retry policy
//! as pages, decode-verified before being trusted, hashed, and handed to
//! storage under a content-addressed filename. Every failure is caught and
//! logged here; image trouble never affects the text outcome of the page
//! that referenced it.

use crate::fetch::FetchClient;
use crate::storage::{ImageRecord, StorageManager};
use crate::HarvestError;
use chrono::Utc;
use image::GenericImageView;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Derives the deterministic, content-addressed image filename
///
/// `{domain}_{sha256(content)}.{format}`: reproducible purely from the
/// domain and the bytes, so identical byte-streams always collide (an
/// overwrite, by design) and distinct ones never do.
pub fn content_filename(domain: &str, bytes: &[u8], extension: &str) -> String {
    let hash = hex::encode(Sha256::digest(bytes));
    format!("{}_{}.{}", domain, hash, extension)
}

/// Fetches, verifies, and stores embedded images
pub struct ImageAcquirer {
    fetch: FetchClient,
    storage: Arc<StorageManager>,
}

impl ImageAcquirer {
    pub fn new(fetch: FetchClient, storage: Arc<StorageManager>) -> Self {
        Self { fetch, storage }
    }

    /// Acquires every candidate URL, isolating failures per image
    ///
    /// Returns how many images were successfully acquired.
    pub async fn acquire_all(&self, image_urls: &[String], domain: &str) -> usize {
        let mut acquired = 0;
        for url in image_urls {
            match self.acquire(url, domain).await {
                Ok(()) => acquired += 1,
                Err(e) => {
                    tracing::error!("Error downloading image {}: {}", url, e);
                }
            }
        }
        acquired
    }

    /// Fetches one image, verifies it decodes, and stores bytes + metadata
    async fn acquire(&self, url: &str, domain: &str) -> Result<(), HarvestError> {
        let bytes = self.fetch.fetch_bytes(url).await?;

        // Verify the payload really is an image before trusting it
        let format = image::guess_format(&bytes).map_err(|e| HarvestError::Image {
            url: url.to_string(),
            message: format!("unrecognized image format: {}", e),
        })?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| HarvestError::Image {
            url: url.to_string(),
            message: format!("failed to decode: {}", e),
        })?;

        let extension = format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("img");

        let record = ImageRecord {
            url: url.to_string(),
            filename: content_filename(domain, &bytes, extension),
            dimensions: decoded.dimensions(),
            format: extension.to_string(),
            source_domain: domain.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            stored: false,
        };

        self.storage.store_image(record, &bytes).await;
        Ok(())
    }
}
