//! Local filesystem section store.
//!
//! Keeps every monitored section in a single JSON document that is rewritten
//! atomically on each upsert.
//!
//! ```text
//! {
//!   "next_id": 3,
//!   "sections": [ { "id": 1, "section_id": "12345", ... }, ... ]
//! }
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::MonitoredSection;
use crate::storage::SectionStore;

/// On-disk document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SectionsFile {
    next_id: u64,
    sections: Vec<MonitoredSection>,
}

impl Default for SectionsFile {
    fn default() -> Self {
        Self {
            next_id: 1,
            sections: Vec::new(),
        }
    }
}

/// JSON file backed section store.
pub struct JsonSectionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonSectionStore {
    /// Create a store backed by the given file. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Read the document, returning an empty one if the file doesn't exist.
    async fn read(&self) -> Result<SectionsFile> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SectionsFile::default()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the document atomically (write to temp, then rename).
    async fn write(&self, data: &SectionsFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(data)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SectionStore for JsonSectionStore {
    async fn find_enabled(&self) -> Result<Vec<MonitoredSection>> {
        let _guard = self.lock.lock().await;
        let data = self.read().await?;
        Ok(data.sections.into_iter().filter(|s| s.enabled).collect())
    }

    async fn find_by_course(&self, course_id: &str) -> Result<Vec<MonitoredSection>> {
        let _guard = self.lock.lock().await;
        let data = self.read().await?;
        Ok(data
            .sections
            .into_iter()
            .filter(|s| s.course_id == course_id)
            .collect())
    }

    async fn upsert(&self, section: &MonitoredSection) -> Result<MonitoredSection> {
        let _guard = self.lock.lock().await;
        let mut data = self.read().await?;

        // Match on section_id so a record can never be duplicated, even when
        // the caller holds a copy that was never saved.
        let position = data
            .sections
            .iter()
            .position(|s| s.section_id == section.section_id);

        let mut stored = section.clone();
        match position {
            Some(i) => {
                if let (Some(existing), Some(incoming)) = (data.sections[i].id, section.id) {
                    if existing != incoming {
                        return Err(AppError::storage(format!(
                            "section {} already stored under id {}, refusing id {}",
                            section.section_id, existing, incoming
                        )));
                    }
                }
                let previous_course = &data.sections[i].course_id;
                if *previous_course != section.course_id {
                    log::warn!(
                        "Section {} moved from course {} to {}",
                        section.section_id,
                        previous_course,
                        section.course_id
                    );
                }
                stored.id = data.sections[i].id;
                data.sections[i] = stored.clone();
            }
            None => {
                stored.id = Some(data.next_id);
                data.next_id += 1;
                data.sections.push(stored.clone());
            }
        }

        self.write(&data).await?;
        log::debug!(
            "Stored section {} (id {:?}, status {:?})",
            stored.section_id,
            stored.id,
            stored.last_status
        );
        Ok(stored)
    }

    async fn find_all(&self) -> Result<Vec<MonitoredSection>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.sections)
    }
}
