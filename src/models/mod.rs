// src/models/mod.rs

//! Domain models for the course monitor.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod section;

// Re-export all public types
pub use config::{
    Config, FetcherConfig, LoggingConfig, MonitorConfig, NotifierConfig, StorageConfig,
};
pub use section::{HistoryEntry, MonitoredSection, ObservedStatus, Status};
