//! Delay between course fetches within a pass.
//!
//! Each delay is `base + uniform(0..=jitter)`, so requests never come faster
//! than `base` apart and never at a fixed rhythm.

use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::MonitorConfig;

/// Outcome of a pacing wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// Jittered inter-course delay.
#[derive(Debug, Clone)]
pub struct PacingController {
    base: Duration,
    jitter: Duration,
}

impl PacingController {
    /// Create a controller. `base` must be non-zero.
    pub fn new(base: Duration, jitter: Duration) -> Result<Self> {
        if base.is_zero() {
            return Err(AppError::validation("pacing base delay must be > 0"));
        }
        Ok(Self { base, jitter })
    }

    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        Self::new(config.pacing_base(), config.pacing_jitter())
    }

    /// Pick the next delay.
    pub fn next_delay(&self) -> Duration {
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        self.base + Duration::from_millis(extra)
    }

    /// Sleep for the next delay, or return early if `cancel` fires.
    pub async fn wait(&self, cancel: &CancellationToken) -> WaitOutcome {
        let delay = self.next_delay();
        log::debug!("Pacing: waiting {:.1}s before next course", delay.as_secs_f64());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => WaitOutcome::Cancelled,
            _ = tokio::time::sleep(delay) => WaitOutcome::Elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_base() {
        assert!(PacingController::new(Duration::ZERO, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_delay_within_bounds() {
        let pacing =
            PacingController::new(Duration::from_secs(120), Duration::from_secs(10)).unwrap();
        for _ in 0..200 {
            let delay = pacing.next_delay();
            assert!(delay >= Duration::from_secs(120));
            assert!(delay <= Duration::from_secs(130));
        }
    }

    #[test]
    fn test_zero_jitter_is_exact() {
        let pacing = PacingController::new(Duration::from_millis(500), Duration::ZERO).unwrap();
        assert_eq!(pacing.next_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_oversized_jitter_is_clamped() {
        let pacing =
            PacingController::new(Duration::from_secs(1), Duration::from_secs(u64::MAX)).unwrap();
        for _ in 0..50 {
            let delay = pacing.next_delay();
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_secs(1) + Duration::from_millis(u64::MAX));
        }
    }

    #[test]
    fn test_from_default_config() {
        let pacing = PacingController::from_config(&MonitorConfig::default()).unwrap();
        assert!(pacing.next_delay() >= Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_elapses() {
        let pacing = PacingController::new(Duration::from_secs(120), Duration::ZERO).unwrap();
        let start = tokio::time::Instant::now();

        let outcome = pacing.wait(&CancellationToken::new()).await;

        assert_eq!(outcome, WaitOutcome::Elapsed);
        assert!(start.elapsed() >= Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_cancelled() {
        let pacing = PacingController::new(Duration::from_secs(120), Duration::ZERO).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let start = tokio::time::Instant::now();
        let outcome = pacing.wait(&cancel).await;

        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(120));
    }
}
