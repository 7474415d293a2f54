//! Output format writers
//!
//! Each enabled format gets one output unit per flush. The serialization
//! codecs themselves are collaborators behind the `FormatWriter` seam; the
//! storage manager only needs "records in, bytes on disk out".

use crate::storage::{StorageError, TextRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serializes a whole text batch to one file of a concrete format
pub trait FormatWriter: Send + Sync {
    /// Format name as it appears in `storage-formats`
    fn name(&self) -> &'static str;

    /// File extension for output units of this format
    fn extension(&self) -> &'static str;

    /// Writes the batch to `path`
    fn write_batch(&self, path: &Path, records: &[TextRecord]) -> Result<(), StorageError>;
}

/// JSON Lines: one record object per line
pub struct JsonlWriter;

impl FormatWriter for JsonlWriter {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn extension(&self) -> &'static str {
        "jsonl"
    }

    fn write_batch(&self, path: &Path, records: &[TextRecord]) -> Result<(), StorageError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// CSV: the columnar output flavor
pub struct CsvWriter;

impl FormatWriter for CsvWriter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write_batch(&self, path: &Path, records: &[TextRecord]) -> Result<(), StorageError> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Resolves a configured format name to its writer
pub fn writer_for(format: &str) -> Option<Box<dyn FormatWriter>> {
    match format {
        "jsonl" => Some(Box::new(JsonlWriter)),
        "csv" => Some(Box::new(CsvWriter)),
        _ => None,
    }
}
