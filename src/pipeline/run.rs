// src/pipeline/run.rs

//! Entry points wiring the shipped collaborators from a [`Config`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::cycle::{MonitorCycle, PassSummary};
use crate::pipeline::pacing::PacingController;
use crate::pipeline::reconcile::CourseReconciler;
use crate::pipeline::scheduler::Scheduler;
use crate::services::{EnrollmentClient, LogNotifier, Notifier, WebhookNotifier};
use crate::storage::{CsvHistoryLog, JsonSectionStore};

/// Build a monitor cycle backed by the HTTP client, JSON store, and CSV history.
pub async fn build_cycle(config: &Config) -> Result<MonitorCycle> {
    config.validate()?;

    let fetcher = Arc::new(EnrollmentClient::new(config.fetcher.clone())?);
    let store = Arc::new(JsonSectionStore::new(&config.storage.sections_file));

    let history = CsvHistoryLog::new(&config.storage.history_file);
    history.init().await?;

    let notifier: Arc<dyn Notifier> = match &config.notifier.webhook_url {
        Some(url) => {
            log::info!("Alerts will be posted to {}", url);
            Arc::new(WebhookNotifier::new(url, config.notifier.clone())?)
        }
        None => {
            log::warn!("No notifier.webhook_url configured; alerts will only be logged");
            Arc::new(LogNotifier::new(&config.notifier.product_name))
        }
    };

    let reconciler = CourseReconciler::new(fetcher, store.clone(), notifier, Arc::new(history))
        .with_enable_discovered(config.monitor.enable_discovered);
    let pacing = PacingController::from_config(&config.monitor)?;

    Ok(MonitorCycle::new(store, reconciler, pacing))
}

/// Run a single pass.
pub async fn run_once(config: &Config, cancel: &CancellationToken) -> Result<PassSummary> {
    let cycle = build_cycle(config).await?;
    Ok(cycle.run_pass(cancel).await)
}

/// Run passes on the configured interval until `cancel` fires.
pub async fn run_scheduler(config: &Config, cancel: CancellationToken) -> Result<usize> {
    let cycle = build_cycle(config).await?;
    let scheduler = Scheduler::new(cycle, config.monitor.poll_interval());
    Ok(scheduler.run(cancel).await)
}
