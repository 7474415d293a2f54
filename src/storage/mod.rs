//! Buffered multi-format storage
//!
//! Text records accumulate in an in-memory buffer and are flushed to every
//! enabled output format once the batch threshold is reached, plus once more
//! at the end of a run. Image bytes are written immediately, unbuffered, and
//! an in-memory ledger keeps their metadata.

mod formats;

pub use formats::{writer_for, CsvWriter, FormatWriter, JsonlWriter};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors raised by the storage layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown storage format: {0}")]
    UnknownFormat(String),

    #[error("Flush failed for {path}: {message}")]
    Flush { path: String, message: String },
}

/// One stored page of cleaned text
///
/// Created by the content pipeline on successful validation, owned by the
/// storage buffer until flushed, never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRecord {
    pub url: String,
    pub content: String,
    /// ISO-8601 creation timestamp
    pub timestamp: String,
    pub source_domain: String,
}

impl TextRecord {
    pub fn new(url: String, content: String, source_domain: String) -> Self {
        Self {
            url,
            content,
            timestamp: Utc::now().to_rfc3339(),
            source_domain,
        }
    }
}

/// Metadata for one acquired image
///
/// The filename is derived purely from the source domain and a SHA-256 of
/// the content bytes, so re-acquiring identical bytes overwrites instead of
/// duplicating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    pub filename: String,
    /// Pixel dimensions as [width, height]
    pub dimensions: (u32, u32),
    pub format: String,
    pub source_domain: String,
    /// ISO-8601 acquisition timestamp
    pub timestamp: String,
    /// Whether the byte write to disk succeeded
    pub stored: bool,
}

#[derive(Default)]
struct StorageState {
    buffer: Vec<TextRecord>,
    images: Vec<ImageRecord>,
    flush_seq: u32,
}

/// Buffers text records and writes images for one run
///
/// The one piece of state mutated by multiple workers; the buffer and image
/// ledger live behind a single async mutex so append-and-maybe-flush is
/// atomic.
pub struct StorageManager {
    output_dir: PathBuf,
    writers: Vec<Box<dyn FormatWriter>>,
    max_text_storage: usize,
    keep_image_metadata_on_write_failure: bool,
    state: Mutex<StorageState>,
}

impl StorageManager {
    /// Creates the storage manager and its output directories
    ///
    /// Fails fast on an unusable output path or unknown format name; this
    /// happens before any worker starts.
    pub fn new(
        output_dir: &Path,
        storage_formats: &[String],
        max_text_storage: usize,
        keep_image_metadata_on_write_failure: bool,
    ) -> Result<Self, StorageError> {
        let mut writers = Vec::new();
        for format in storage_formats {
            let writer =
                writer_for(format).ok_or_else(|| StorageError::UnknownFormat(format.clone()))?;
            writers.push(writer);
        }

        std::fs::create_dir_all(output_dir)?;
        std::fs::create_dir_all(output_dir.join("images"))?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            writers,
            max_text_storage,
            keep_image_metadata_on_write_failure,
            state: Mutex::new(StorageState::default()),
        })
    }

    /// Appends a text record, flushing when the batch threshold is reached
    pub async fn store_text(&self, record: TextRecord) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        state.buffer.push(record);
        if state.buffer.len() >= self.max_text_storage {
            self.flush_locked(&mut state)?;
        }
        Ok(())
    }

    /// Flushes any buffered text records to every enabled format
    ///
    /// Safe to call with an empty buffer (no-op, no file). Called once more
    /// at the end of a run for the remainder below the threshold.
    pub async fn flush_text(&self) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        self.flush_locked(&mut state)
    }

    fn flush_locked(&self, state: &mut StorageState) -> Result<(), StorageError> {
        if state.buffer.is_empty() {
            return Ok(());
        }

        state.flush_seq += 1;
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let mut first_error: Option<StorageError> = None;

        for writer in &self.writers {
            let path = self.output_dir.join(format!(
                "text_{}_{:04}.{}",
                stamp,
                state.flush_seq,
                writer.extension()
            ));

            match writer.write_batch(&path, &state.buffer) {
                Ok(()) => {
                    tracing::info!(
                        "Flushed {} text records to {}",
                        state.buffer.len(),
                        path.display()
                    );
                }
                Err(e) => {
                    // The batch for this flush attempt may be lost; accepted
                    // and surfaced rather than silently hidden
                    tracing::error!("Flush to {} failed: {}", path.display(), e);
                    first_error.get_or_insert(StorageError::Flush {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        state.buffer.clear();

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Writes image bytes immediately and records the metadata
    ///
    /// A write failure is logged, never raised; whether the metadata entry
    /// survives the failure is configurable.
    pub async fn store_image(&self, mut record: ImageRecord, bytes: &[u8]) {
        let path = self.output_dir.join("images").join(&record.filename);

        match std::fs::write(&path, bytes) {
            Ok(()) => {
                record.stored = true;
                tracing::info!("Saved image {}", record.filename);
                self.state.lock().await.images.push(record);
            }
            Err(e) => {
                tracing::error!("Error saving image {}: {}", record.filename, e);
                if self.keep_image_metadata_on_write_failure {
                    record.stored = false;
                    self.state.lock().await.images.push(record);
                }
            }
        }
    }

    /// Number of text records currently buffered
    pub async fn buffered_len(&self) -> usize {
        self.state.lock().await.buffer.len()
    }

    /// Snapshot of the image ledger
    pub async fn image_ledger(&self) -> Vec<ImageRecord> {
        self.state.lock().await.images.clone()
    }

    /// The run's output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
