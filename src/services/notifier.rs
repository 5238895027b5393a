// src/services/notifier.rs

//! Alert delivery.
//!
//! Alerts are posted as JSON to a webhook (mail relay, chat hook, ...). When
//! no webhook is configured they are written to the log instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::NotifierConfig;
use crate::services::Notifier;

/// Which transition an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Open,
    Waitlisted,
}

/// A single alert for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub section_id: String,
    pub course_info: String,
}

impl Alert {
    pub fn new(kind: AlertKind, section_id: &str, course_info: &str) -> Self {
        Self {
            kind,
            section_id: section_id.to_string(),
            course_info: course_info.to_string(),
        }
    }

    pub fn subject(&self) -> String {
        match self.kind {
            AlertKind::Open => format!("Alert: Section {} IS OPEN!", self.section_id),
            AlertKind::Waitlisted => {
                format!("ALERT: Section {} HAS WAITLIST SEATS!", self.section_id)
            }
        }
    }

    pub fn body(&self, product_name: &str) -> String {
        format!(
            "Go to Enroll!\n\nCourse Info: {}\n\n(This message is sent automatically by {})",
            self.course_info, product_name
        )
    }
}

/// JSON document posted to the webhook.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    kind: AlertKind,
    section_id: &'a str,
    course_info: &'a str,
    from: &'a str,
    to: &'a str,
    subject: String,
    text: String,
}

/// Posts alerts to an HTTP endpoint.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    config: NotifierConfig,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, config: NotifierConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            client,
            url: url.into(),
            config,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, alert: &Alert) -> Result<()> {
        log::info!(
            "Sending {:?} alert for section {}",
            alert.kind,
            alert.section_id
        );

        let payload = WebhookPayload {
            kind: alert.kind,
            section_id: &alert.section_id,
            course_info: &alert.course_info,
            from: &self.config.from,
            to: &self.config.to,
            subject: alert.subject(),
            text: alert.body(&self.config.product_name),
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(AppError::notify(format!(
                "webhook returned HTTP {} for section {}",
                response.status(),
                alert.section_id
            )));
        }

        log::info!("Alert delivered for section {}", alert.section_id);
        Ok(())
    }
}

/// Writes alerts to the log. Used when no webhook is configured.
pub struct LogNotifier {
    product_name: String,
}

impl LogNotifier {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, alert: &Alert) -> Result<()> {
        log::warn!(
            "{} | {}",
            alert.subject(),
            alert.body(&self.product_name).replace('\n', " ")
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_alert_text() {
        let alert = Alert::new(AlertKind::Open, "12345", "COMP SCI 400");
        assert_eq!(alert.subject(), "Alert: Section 12345 IS OPEN!");
        assert!(alert.body("course-monitor").contains("Course Info: COMP SCI 400"));
        assert!(alert.body("course-monitor").ends_with("by course-monitor)"));
    }

    #[test]
    fn test_waitlist_alert_text() {
        let alert = Alert::new(AlertKind::Waitlisted, "12345", "COMP SCI 400");
        assert_eq!(alert.subject(), "ALERT: Section 12345 HAS WAITLIST SEATS!");
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let notifier = LogNotifier::new("course-monitor");
        assert!(notifier.notify_open("1", "MATH 221").await.is_ok());
        assert!(notifier.notify_waitlisted("1", "MATH 221").await.is_ok());
    }
}
