// src/pipeline/cycle.rs

//! One monitoring pass.
//!
//! Enabled sections are collapsed to their distinct course ids, and each
//! course is reconciled in turn with a pacing delay in between. A course
//! that fails (fetch error, store error, or panic) is logged and skipped;
//! the rest of the pass continues.

use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::pipeline::pacing::{PacingController, WaitOutcome};
use crate::pipeline::reconcile::{CourseReconciler, ReconcileSummary};
use crate::storage::SectionStore;

/// Outcome of a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub courses_total: usize,
    pub courses_reconciled: usize,
    pub courses_failed: usize,
    /// The pass stopped early because of cancellation
    pub cancelled: bool,
    pub sections: ReconcileSummary,
}

/// Orchestrates a single pass over all monitored courses.
pub struct MonitorCycle {
    store: Arc<dyn SectionStore>,
    reconciler: CourseReconciler,
    pacing: PacingController,
}

impl MonitorCycle {
    pub fn new(
        store: Arc<dyn SectionStore>,
        reconciler: CourseReconciler,
        pacing: PacingController,
    ) -> Self {
        Self {
            store,
            reconciler,
            pacing,
        }
    }

    /// Run one complete pass. Never fails; problems are logged and counted.
    pub async fn run_pass(&self, cancel: &CancellationToken) -> PassSummary {
        let mut summary = PassSummary::default();

        let enabled = match self.store.find_enabled().await {
            Ok(sections) => sections,
            Err(e) => {
                log::error!("Failed to load enabled sections, skipping pass: {}", e);
                return summary;
            }
        };

        let courses: BTreeSet<String> = enabled.into_iter().map(|s| s.course_id).collect();
        if courses.is_empty() {
            log::info!("No active sections. Idle.");
            return summary;
        }

        summary.courses_total = courses.len();
        log::info!(
            "Starting pass. Monitoring {} unique course(s).",
            courses.len()
        );

        let last = courses.len() - 1;
        for (i, course_id) in courses.iter().enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            match AssertUnwindSafe(self.reconciler.reconcile(course_id))
                .catch_unwind()
                .await
            {
                Ok(Ok(course)) => {
                    log::info!(
                        "Course {}: {} section(s), {} created, {} updated, {} alert(s)",
                        course_id,
                        course.observed,
                        course.created,
                        course.updated,
                        course.alerts()
                    );
                    summary.courses_reconciled += 1;
                    summary.sections.absorb(&course);
                }
                Ok(Err(e)) if e.is_fetch_failure() => {
                    log::warn!("Fetch failed or blocked for course {}: {}", course_id, e);
                    summary.courses_failed += 1;
                }
                Ok(Err(e)) => {
                    log::error!("Error processing course {}: {}", course_id, e);
                    summary.courses_failed += 1;
                }
                Err(_) => {
                    log::error!("Panic while processing course {}", course_id);
                    summary.courses_failed += 1;
                }
            }

            if i < last && self.pacing.wait(cancel).await == WaitOutcome::Cancelled {
                summary.cancelled = true;
                break;
            }
        }

        if summary.cancelled {
            log::info!(
                "Pass cancelled after {} of {} course(s)",
                summary.courses_reconciled + summary.courses_failed,
                summary.courses_total
            );
        } else {
            log::info!(
                "Pass complete: {} reconciled, {} failed, {} alert(s)",
                summary.courses_reconciled,
                summary.courses_failed,
                summary.sections.alerts()
            );
        }

        summary
    }
}
