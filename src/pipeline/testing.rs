//! In-memory collaborators for pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{HistoryEntry, MonitoredSection, ObservedStatus, Status};
use crate::services::{Alert, AlertKind, Notifier, StatusFetcher};
use crate::storage::{HistoryLog, SectionStore};

pub fn observed(section_id: &str, course_id: &str, status: Status) -> ObservedStatus {
    ObservedStatus {
        subject_code: "COMP SCI".to_string(),
        catalog_number: "400".to_string(),
        section_id: section_id.to_string(),
        course_id: course_id.to_string(),
        status,
    }
}

pub fn section(
    section_id: &str,
    course_id: &str,
    enabled: bool,
    last_status: Option<Status>,
) -> MonitoredSection {
    MonitoredSection {
        id: None,
        subject_code: "COMP SCI".to_string(),
        catalog_number: "400".to_string(),
        section_id: section_id.to_string(),
        course_id: course_id.to_string(),
        course_display_name: "COMP SCI 400".to_string(),
        enabled,
        last_status,
    }
}

#[derive(Default)]
struct StoreState {
    next_id: u64,
    sections: Vec<MonitoredSection>,
}

/// Section store that counts calls and can be told to fail.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    upserts: Mutex<usize>,
    course_loads: Mutex<Vec<String>>,
    failing_sections: Mutex<HashSet<String>>,
    fail_find_enabled: Mutex<bool>,
}

impl MemoryStore {
    /// Seed records, assigning ids as a real store would.
    pub fn with_sections(sections: Vec<MonitoredSection>) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            for mut s in sections {
                state.next_id += 1;
                s.id = Some(state.next_id);
                state.sections.push(s);
            }
        }
        store
    }

    pub fn get(&self, section_id: &str) -> Option<MonitoredSection> {
        let state = self.state.lock().unwrap();
        state
            .sections
            .iter()
            .find(|s| s.section_id == section_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().sections.len()
    }

    pub fn upserts(&self) -> usize {
        *self.upserts.lock().unwrap()
    }

    pub fn course_loads(&self) -> Vec<String> {
        self.course_loads.lock().unwrap().clone()
    }

    pub fn fail_upsert_for(&self, section_id: &str) {
        self.failing_sections
            .lock()
            .unwrap()
            .insert(section_id.to_string());
    }

    pub fn fail_find_enabled(&self) {
        *self.fail_find_enabled.lock().unwrap() = true;
    }
}

#[async_trait]
impl SectionStore for MemoryStore {
    async fn find_enabled(&self) -> Result<Vec<MonitoredSection>> {
        if *self.fail_find_enabled.lock().unwrap() {
            return Err(AppError::storage("find_enabled unavailable"));
        }
        let state = self.state.lock().unwrap();
        Ok(state.sections.iter().filter(|s| s.enabled).cloned().collect())
    }

    async fn find_by_course(&self, course_id: &str) -> Result<Vec<MonitoredSection>> {
        self.course_loads.lock().unwrap().push(course_id.to_string());
        let state = self.state.lock().unwrap();
        Ok(state
            .sections
            .iter()
            .filter(|s| s.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn upsert(&self, section: &MonitoredSection) -> Result<MonitoredSection> {
        if self.failing_sections.lock().unwrap().contains(&section.section_id) {
            return Err(AppError::storage(format!(
                "write refused for {}",
                section.section_id
            )));
        }
        *self.upserts.lock().unwrap() += 1;

        let mut state = self.state.lock().unwrap();
        let mut stored = section.clone();
        match state
            .sections
            .iter()
            .position(|s| s.section_id == section.section_id)
        {
            Some(i) => {
                stored.id = state.sections[i].id;
                state.sections[i] = stored.clone();
            }
            None => {
                state.next_id += 1;
                stored.id = Some(state.next_id);
                state.sections.push(stored.clone());
            }
        }
        Ok(stored)
    }

    async fn find_all(&self) -> Result<Vec<MonitoredSection>> {
        Ok(self.state.lock().unwrap().sections.clone())
    }
}

/// What a scripted fetch does for one course.
#[derive(Clone)]
pub enum Script {
    Sections(Vec<ObservedStatus>),
    Fail,
    Panic,
}

/// Fetcher returning canned responses and recording every call.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn set(&self, course_id: &str, sections: Vec<ObservedStatus>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(course_id.to_string(), Script::Sections(sections));
    }

    pub fn script(&self, course_id: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .insert(course_id.to_string(), script);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusFetcher for ScriptedFetcher {
    async fn fetch(&self, course_id: &str) -> Result<Vec<ObservedStatus>> {
        self.calls.lock().unwrap().push(course_id.to_string());
        let script = self.scripts.lock().unwrap().get(course_id).cloned();
        match script {
            Some(Script::Sections(sections)) => Ok(sections),
            Some(Script::Fail) | None => Err(AppError::Blocked {
                course_id: course_id.to_string(),
                status: 403,
            }),
            Some(Script::Panic) => panic!("scripted panic for {}", course_id),
        }
    }
}

/// Notifier that records alerts, optionally failing after recording.
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<Alert>>,
    fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        *notifier.fail.lock().unwrap() = true;
        notifier
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<AlertKind> {
        self.alerts().into_iter().map(|a| a.kind).collect()
    }

    pub fn clear(&self) {
        self.alerts.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, alert: &Alert) -> Result<()> {
        self.alerts.lock().unwrap().push(alert.clone());
        if *self.fail.lock().unwrap() {
            return Err(AppError::notify("relay down"));
        }
        Ok(())
    }
}

/// History log that keeps entries in memory.
#[derive(Default)]
pub struct RecordingHistory {
    entries: Mutex<Vec<HistoryEntry>>,
    fail: Mutex<bool>,
}

impl RecordingHistory {
    pub fn failing() -> Self {
        let history = Self::default();
        *history.fail.lock().unwrap() = true;
        history
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.observed.status)
            .collect()
    }
}

#[async_trait]
impl HistoryLog for RecordingHistory {
    async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::Io(std::io::Error::other("disk full")));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}
