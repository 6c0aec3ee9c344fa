//! CSV-backed persistence for cleaned disruption rows.
//!
//! Rows are appended to a single CSV file (headers written on creation) and
//! read back, filtered and ordered, for aggregation.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use tracing::debug;

use crate::cleaner::DisruptionRow;

/// Explicit store location. The original deployment picked its backend from
/// ambient environment state; here the choice is a constructor argument.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

/// Append-only sink and time-bounded source of [`DisruptionRow`]s.
pub struct RowStore {
    config: StoreConfig,
}

impl RowStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Appends rows, creating the file (and its parent directory) with
    /// headers on first write. Appends are not deduplicated; avoiding
    /// duplicate batches is the caller's responsibility.
    pub fn append_rows(&self, rows: &[DisruptionRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let path = &self.config.path;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file_exists = path.exists();
        debug!(path = %path.display(), file_exists, rows = rows.len(), "appending rows");

        let file = OpenOptions::new().append(true).create(true).open(path)?;

        let mut writer = WriterBuilder::new()
            .has_headers(!file_exists) // IMPORTANT when appending
            .from_writer(file);

        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Returns rows with `start_time >= since`, ordered ascending by
    /// `start_time`. A store that was never written to yields no rows.
    pub fn fetch_rows(&self, since: DateTime<Utc>) -> Result<Vec<DisruptionRow>> {
        let path = &self.config.path;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path)?;
        let mut rdr = csv::Reader::from_reader(file);

        let mut rows = Vec::new();
        for result in rdr.deserialize() {
            let row: DisruptionRow = result?;
            if row.start_time >= since {
                rows.push(row);
            }
        }

        rows.sort_by_key(|r| r.start_time);
        Ok(rows)
    }
}
