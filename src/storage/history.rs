//! CSV history log.
//!
//! One line per persisted status change:
//!
//! ```text
//! Timestamp,Subject,CatalogNumber,Section,Status,CourseId
//! 2026-01-14 09:30:12,COMP SCI,400,12345,OPEN,004289
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::HistoryEntry;
use crate::storage::HistoryLog;

const HEADER: &str = "Timestamp,Subject,CatalogNumber,Section,Status,CourseId";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only CSV file.
pub struct CsvHistoryLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvHistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create the parent directory and write the header if the file is new.
    pub async fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if !tokio::fs::try_exists(&self.path).await? {
            tokio::fs::write(&self.path, format!("{HEADER}\n")).await?;
            log::info!("Created history file: {}", self.path.display());
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Render one history line (without trailing newline).
fn format_line(entry: &HistoryEntry) -> String {
    let timestamp = entry.timestamp.format(TIME_FORMAT).to_string();
    let observed = &entry.observed;
    [
        timestamp.as_str(),
        observed.subject_code.as_str(),
        observed.catalog_number.as_str(),
        observed.section_id.as_str(),
        observed.status.as_str(),
        observed.course_id.as_str(),
    ]
    .iter()
    .map(|field| escape_csv(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Quote a field if it contains a comma, quote, or newline.
fn escape_csv(value: &str) -> String {
    let escaped = value.replace('"', "\"\"");
    if escaped.contains(',') || escaped.contains('"') || escaped.contains('\n') {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}

#[async_trait]
impl HistoryLog for CsvHistoryLog {
    async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", format_line(entry)).as_bytes())
            .await?;
        file.flush().await?;
        Ok(())
    }
}
