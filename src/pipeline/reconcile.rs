// src/pipeline/reconcile.rs

//! Per-course reconciliation.
//!
//! One fetch and one bulk store load per course, then each observed section
//! is compared against its stored record. Writes happen only when a status
//! changes or a record has never been saved, so unchanged sections cost no
//! store or history traffic.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{HistoryEntry, MonitoredSection, ObservedStatus};
use crate::pipeline::transition::{AlertAction, decide};
use crate::services::{Notifier, StatusFetcher};
use crate::storage::{HistoryLog, SectionStore};

/// Counters for one course (or, summed, for one pass).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub observed: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub open_alerts: usize,
    pub waitlist_alerts: usize,
    pub write_failures: usize,
}

impl ReconcileSummary {
    pub fn absorb(&mut self, other: &ReconcileSummary) {
        self.observed += other.observed;
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.open_alerts += other.open_alerts;
        self.waitlist_alerts += other.waitlist_alerts;
        self.write_failures += other.write_failures;
    }

    pub fn alerts(&self) -> usize {
        self.open_alerts + self.waitlist_alerts
    }
}

/// Reconciles fetched section statuses against stored records.
pub struct CourseReconciler {
    fetcher: Arc<dyn StatusFetcher>,
    store: Arc<dyn SectionStore>,
    notifier: Arc<dyn Notifier>,
    history: Arc<dyn HistoryLog>,
    enable_discovered: bool,
}

impl CourseReconciler {
    pub fn new(
        fetcher: Arc<dyn StatusFetcher>,
        store: Arc<dyn SectionStore>,
        notifier: Arc<dyn Notifier>,
        history: Arc<dyn HistoryLog>,
    ) -> Self {
        Self {
            fetcher,
            store,
            notifier,
            history,
            enable_discovered: false,
        }
    }

    /// Set the `enabled` flag given to newly discovered sections.
    pub fn with_enable_discovered(mut self, enabled: bool) -> Self {
        self.enable_discovered = enabled;
        self
    }

    /// Reconcile one course.
    ///
    /// Returns an error without touching the store, notifier, or history if
    /// the fetch or the initial store load fails.
    pub async fn reconcile(&self, course_id: &str) -> Result<ReconcileSummary> {
        let observations = self.fetcher.fetch(course_id).await?;

        let mut index: HashMap<String, MonitoredSection> = HashMap::new();
        for section in self.store.find_by_course(course_id).await? {
            index.entry(section.section_id.clone()).or_insert(section);
        }

        let mut summary = ReconcileSummary {
            observed: observations.len(),
            ..ReconcileSummary::default()
        };

        for observed in &observations {
            self.reconcile_section(observed, &mut index, &mut summary)
                .await;
        }

        Ok(summary)
    }

    async fn reconcile_section(
        &self,
        observed: &ObservedStatus,
        index: &mut HashMap<String, MonitoredSection>,
        summary: &mut ReconcileSummary,
    ) {
        let current = observed.status;

        let (mut section, previous, is_new) = match index.remove(&observed.section_id) {
            None => {
                log::info!(
                    "New section found {} in course {}. Adding to store.",
                    observed.section_id,
                    observed.course_id
                );
                // Discovered sections are evaluated even when not enabled.
                self.dispatch(decide(None, current), observed, summary)
                    .await;
                (
                    MonitoredSection::discovered(observed, self.enable_discovered),
                    None,
                    true,
                )
            }
            Some(section) => {
                let previous = section.last_status;
                if section.enabled {
                    self.dispatch(decide(previous, current), observed, summary)
                        .await;
                }
                (section, previous, false)
            }
        };

        if previous == Some(current) && section.is_persisted() {
            summary.unchanged += 1;
            index.insert(observed.section_id.clone(), section);
            return;
        }

        if !is_new {
            log::info!(
                "State changed: {} -> {} for {}",
                previous.map_or("UNSET", |s| s.as_str()),
                current,
                observed.section_id
            );
        }
        section.last_status = Some(current);

        match self.store.upsert(&section).await {
            Ok(stored) => {
                if is_new {
                    summary.created += 1;
                } else {
                    summary.updated += 1;
                }
                if let Err(e) = self.history.append(&HistoryEntry::now(observed)).await {
                    log::error!(
                        "Failed to append history for section {}: {}",
                        observed.section_id,
                        e
                    );
                }
                index.insert(observed.section_id.clone(), stored);
            }
            Err(e) => {
                summary.write_failures += 1;
                log::error!("Failed to save section {}: {}", observed.section_id, e);
                index.insert(observed.section_id.clone(), section);
            }
        }
    }

    async fn dispatch(
        &self,
        action: AlertAction,
        observed: &ObservedStatus,
        summary: &mut ReconcileSummary,
    ) {
        let course_info = observed.course_info();
        let result = match action {
            AlertAction::None => return,
            AlertAction::NotifyOpen => {
                log::info!("ALERT OPEN detected for {}", observed.section_id);
                summary.open_alerts += 1;
                self.notifier
                    .notify_open(&observed.section_id, &course_info)
                    .await
            }
            AlertAction::NotifyWaitlisted => {
                log::info!("ALERT WAITLIST detected for {}", observed.section_id);
                summary.waitlist_alerts += 1;
                self.notifier
                    .notify_waitlisted(&observed.section_id, &course_info)
                    .await
            }
        };

        if let Err(e) = result {
            log::error!(
                "Failed to send alert for section {}: {}",
                observed.section_id,
                e
            );
        }
    }
}
