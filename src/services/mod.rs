//! Outbound services: the remote catalog client and alert delivery.
//!
//! - `StatusFetcher`: Course section statuses from the remote catalog
//! - `Notifier`: Alerts for sections that became enrollable

pub mod enrollment;
pub mod notifier;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ObservedStatus;

pub use enrollment::EnrollmentClient;
pub use notifier::{Alert, AlertKind, LogNotifier, WebhookNotifier};

/// Source of current section statuses.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Fetch every section of one course.
    ///
    /// `Ok(vec![])` means the course currently has no sections; any failure to
    /// get a trustworthy answer (blocked, network, malformed body) is an `Err`.
    async fn fetch(&self, course_id: &str) -> Result<Vec<ObservedStatus>>;
}

/// Alert delivery channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<()>;

    /// Alert that a section has open seats.
    async fn notify_open(&self, section_id: &str, course_info: &str) -> Result<()> {
        self.send(&Alert::new(AlertKind::Open, section_id, course_info))
            .await
    }

    /// Alert that a section has waitlist seats.
    async fn notify_waitlisted(&self, section_id: &str, course_info: &str) -> Result<()> {
        self.send(&Alert::new(AlertKind::Waitlisted, section_id, course_info))
            .await
    }
}
