//! Monitoring pipeline.
//!
//! - `transition`: Alert decision for a status change
//! - `pacing`: Jittered delay between course fetches
//! - `reconcile`: Fetch one course and reconcile its sections
//! - `cycle`: One pass over every monitored course
//! - `scheduler`: Fixed-delay loop running passes until shutdown

pub mod cycle;
pub mod pacing;
pub mod reconcile;
pub mod run;
pub mod scheduler;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing;

pub use cycle::{MonitorCycle, PassSummary};
pub use pacing::{PacingController, WaitOutcome};
pub use reconcile::{CourseReconciler, ReconcileSummary};
pub use run::{build_cycle, run_once, run_scheduler};
pub use scheduler::Scheduler;
pub use transition::{AlertAction, decide};
