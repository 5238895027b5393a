//! Section data structures.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Enrollment state of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Closed,
    Waitlisted,
    Open,
}

impl Status {
    /// Upper-case name used in storage and history files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Closed => "CLOSED",
            Status::Waitlisted => "WAITLISTED",
            Status::Open => "OPEN",
        }
    }

    /// Parse a status string as reported by the remote catalog.
    pub fn from_remote(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CLOSED" => Some(Status::Closed),
            "WAITLISTED" => Some(Status::Waitlisted),
            "OPEN" => Some(Status::Open),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A section being watched, one record per `section_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitoredSection {
    /// Store-assigned identifier, `None` until first persisted
    #[serde(default)]
    pub id: Option<u64>,

    /// Subject code (e.g. "COMP SCI")
    pub subject_code: String,

    /// Catalog number (e.g. "400")
    pub catalog_number: String,

    /// Section identifier, unique across the store
    pub section_id: String,

    /// Owning course identifier
    pub course_id: String,

    /// Human-readable course name
    #[serde(default)]
    pub course_display_name: String,

    /// Whether alerts fire for this section
    #[serde(default)]
    pub enabled: bool,

    /// Last observed status, `None` if never observed
    #[serde(default)]
    pub last_status: Option<Status>,
}

impl MonitoredSection {
    /// Build an unsaved record for a section seen for the first time.
    pub fn discovered(observed: &ObservedStatus, enabled: bool) -> Self {
        Self {
            id: None,
            subject_code: observed.subject_code.clone(),
            catalog_number: observed.catalog_number.clone(),
            section_id: observed.section_id.clone(),
            course_id: observed.course_id.clone(),
            course_display_name: observed.course_info(),
            enabled,
            last_status: Some(observed.status),
        }
    }

    /// Whether the store has ever saved this record.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// One section's status as returned by a single fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObservedStatus {
    pub subject_code: String,
    pub catalog_number: String,
    pub section_id: String,
    pub course_id: String,
    pub status: Status,
}

impl ObservedStatus {
    /// Course label used in alerts, e.g. "COMP SCI 400".
    pub fn course_info(&self) -> String {
        format!("{} {}", self.subject_code, self.catalog_number)
    }
}

/// A timestamped observation appended to the history log.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Local>,
    pub observed: ObservedStatus,
}

impl HistoryEntry {
    /// Stamp an observation with the current local time.
    pub fn now(observed: &ObservedStatus) -> Self {
        Self {
            timestamp: Local::now(),
            observed: observed.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_observed(status: Status) -> ObservedStatus {
        ObservedStatus {
            subject_code: "COMP SCI".to_string(),
            catalog_number: "400".to_string(),
            section_id: "12345".to_string(),
            course_id: "004289".to_string(),
            status,
        }
    }

    #[test]
    fn test_status_from_remote() {
        assert_eq!(Status::from_remote("OPEN"), Some(Status::Open));
        assert_eq!(Status::from_remote(" waitlisted "), Some(Status::Waitlisted));
        assert_eq!(Status::from_remote("Closed"), Some(Status::Closed));
        assert_eq!(Status::from_remote("CANCELLED"), None);
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_string(&Status::Waitlisted).unwrap();
        assert_eq!(json, "\"WAITLISTED\"");
    }

    #[test]
    fn test_discovered_copies_observation() {
        let observed = sample_observed(Status::Open);
        let section = MonitoredSection::discovered(&observed, false);

        assert!(!section.is_persisted());
        assert!(!section.enabled);
        assert_eq!(section.section_id, "12345");
        assert_eq!(section.course_display_name, "COMP SCI 400");
        assert_eq!(section.last_status, Some(Status::Open));
    }

    #[test]
    fn test_section_defaults_on_sparse_json() {
        let json = r#"{
            "subject_code": "MATH",
            "catalog_number": "221",
            "section_id": "777",
            "course_id": "012345"
        }"#;
        let section: MonitoredSection = serde_json::from_str(json).unwrap();
        assert_eq!(section.id, None);
        assert!(!section.enabled);
        assert_eq!(section.last_status, None);
    }
}
