//! Storage abstractions for monitored sections and status history.
//!
//! ## File Layout
//!
//! ```text
//! data/
//! └── sections.json     # One record per monitored section
//! logs/
//! └── history.csv       # Append-only status history
//! ```

pub mod history;
pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{HistoryEntry, MonitoredSection};

// Re-export for convenience
pub use history::CsvHistoryLog;
pub use local::JsonSectionStore;

/// Trait for monitored section persistence.
///
/// Implementations keep at most one record per `section_id`.
#[async_trait]
pub trait SectionStore: Send + Sync {
    /// All records with `enabled == true`.
    async fn find_enabled(&self) -> Result<Vec<MonitoredSection>>;

    /// All records owned by one course, enabled or not.
    async fn find_by_course(&self, course_id: &str) -> Result<Vec<MonitoredSection>>;

    /// Insert or update a record, returning it as stored (with `id` assigned).
    async fn upsert(&self, section: &MonitoredSection) -> Result<MonitoredSection>;

    /// Every stored record.
    async fn find_all(&self) -> Result<Vec<MonitoredSection>>;
}

/// Trait for the append-only status history.
#[async_trait]
pub trait HistoryLog: Send + Sync {
    async fn append(&self, entry: &HistoryEntry) -> Result<()>;
}
