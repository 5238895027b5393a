// src/error.rs

//! Unified error handling for the course monitor.

use std::fmt;

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote catalog refused the request (rate limit or bot wall)
    #[error("Fetch blocked for course {course_id} (HTTP {status})")]
    Blocked { course_id: String, status: u16 },

    /// Fetching or decoding a course's section statuses failed
    #[error("Fetch error for course {course_id}: {message}")]
    Fetch { course_id: String, message: String },

    /// Section store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Alert delivery failure
    #[error("Notify error: {0}")]
    Notify(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with the course as context.
    pub fn fetch(course_id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            course_id: course_id.into(),
            message: message.to_string(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }

    /// Create a notification error.
    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    /// Whether this error came from fetching a course (as opposed to a bug or local I/O).
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Blocked { .. } | Self::Fetch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = AppError::fetch("004289", "empty body");
        assert_eq!(
            err.to_string(),
            "Fetch error for course 004289: empty body"
        );
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn test_blocked_is_fetch_failure() {
        let err = AppError::Blocked {
            course_id: "004289".into(),
            status: 429,
        };
        assert!(err.is_fetch_failure());
        assert!(!AppError::storage("disk full").is_fetch_failure());
    }
}
