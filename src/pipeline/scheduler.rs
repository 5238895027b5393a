//! Fixed-delay pass scheduler.
//!
//! The next pass starts `interval` after the previous one finished, so passes
//! can never overlap no matter how long pacing makes them.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::pipeline::cycle::MonitorCycle;

/// Runs passes back to back until cancelled.
pub struct Scheduler {
    cycle: MonitorCycle,
    interval: Duration,
}

impl Scheduler {
    pub fn new(cycle: MonitorCycle, interval: Duration) -> Self {
        Self { cycle, interval }
    }

    /// Run until `cancel` fires. The first pass starts immediately.
    ///
    /// Returns the number of passes that were started.
    pub async fn run(&self, cancel: CancellationToken) -> usize {
        log::info!(
            "Scheduler started: {:.0}s between passes",
            self.interval.as_secs_f64()
        );

        let mut passes = 0;
        while !cancel.is_cancelled() {
            passes += 1;
            let summary = self.cycle.run_pass(&cancel).await;
            if summary.cancelled {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        log::info!("Scheduler stopped after {} pass(es)", passes);
        passes
    }
}
