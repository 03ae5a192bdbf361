//! Output formatting and persistence for daily posture summaries.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use tracing::{debug, info};

use crate::stats::DailySummary;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &DailySummary) {
    debug!("{:#?}", summary);
}

/// Logs a summary as pretty-printed JSON.
pub fn print_json(summary: &DailySummary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Appends a [`DailySummary`] record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, summary: &DailySummary) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}
