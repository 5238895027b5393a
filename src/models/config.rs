//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Pass scheduling and pacing
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Remote catalog client settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Alert delivery settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// File locations for sections and history
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults only when the file does
    /// not exist. A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write configuration as TOML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.poll_interval_ms == 0 {
            return Err(AppError::validation("monitor.poll_interval_ms must be > 0"));
        }
        if self.monitor.pacing_base_ms == 0 {
            return Err(AppError::validation("monitor.pacing_base_ms must be > 0"));
        }
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        if !self.fetcher.url_template.contains("{course_id}") {
            return Err(AppError::validation(
                "fetcher.url_template must contain {course_id}",
            ));
        }
        Url::parse(&self.fetcher.course_url("000000"))?;
        if let Some(webhook) = &self.notifier.webhook_url {
            Url::parse(webhook)?;
        }
        if self.storage.sections_file.trim().is_empty() {
            return Err(AppError::validation("storage.sections_file is empty"));
        }
        if self.storage.history_file.trim().is_empty() {
            return Err(AppError::validation("storage.history_file is empty"));
        }
        Ok(())
    }
}

/// Pass scheduling and pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Delay between the end of one pass and the start of the next
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_ms: u64,

    /// Minimum delay between two course fetches within a pass
    #[serde(default = "defaults::pacing_base")]
    pub pacing_base_ms: u64,

    /// Upper bound of the random delay added on top of the base
    #[serde(default = "defaults::pacing_jitter")]
    pub pacing_jitter_ms: u64,

    /// Enabled flag given to sections discovered during reconciliation
    #[serde(default)]
    pub enable_discovered: bool,
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn pacing_base(&self) -> Duration {
        Duration::from_millis(self.pacing_base_ms)
    }

    pub fn pacing_jitter(&self) -> Duration {
        Duration::from_millis(self.pacing_jitter_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: defaults::poll_interval(),
            pacing_base_ms: defaults::pacing_base(),
            pacing_jitter_ms: defaults::pacing_jitter(),
            enable_discovered: false,
        }
    }
}

/// Remote catalog client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Course status endpoint. Supports `{term}` and `{course_id}` placeholders.
    #[serde(default = "defaults::url_template")]
    pub url_template: String,

    /// Academic term code substituted for `{term}`
    #[serde(default = "defaults::term_code")]
    pub term_code: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl FetcherConfig {
    /// Render the endpoint for one course.
    pub fn course_url(&self, course_id: &str) -> String {
        self.url_template
            .replace("{term}", &self.term_code)
            .replace("{course_id}", course_id)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            url_template: defaults::url_template(),
            term_code: defaults::term_code(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Alert delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Webhook receiving alerts as JSON. Alerts are only logged when unset.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Sender address passed along with each alert
    #[serde(default)]
    pub from: String,

    /// Recipient address passed along with each alert
    #[serde(default)]
    pub to: String,

    /// Name signed at the bottom of each alert body
    #[serde(default = "defaults::product_name")]
    pub product_name: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            from: String::new(),
            to: String::new(),
            product_name: defaults::product_name(),
        }
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::sections_file")]
    pub sections_file: String,

    #[serde(default = "defaults::history_file")]
    pub history_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sections_file: defaults::sections_file(),
            history_file: defaults::history_file(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Monitor defaults
    pub fn poll_interval() -> u64 {
        300_000
    }
    pub fn pacing_base() -> u64 {
        120_000
    }
    pub fn pacing_jitter() -> u64 {
        10_000
    }

    // Fetcher defaults
    pub fn url_template() -> String {
        "https://public.enroll.wisc.edu/api/search/v1/enrollmentPackages/{term}/{course_id}".into()
    }
    pub fn term_code() -> String {
        "1262".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; course-monitor/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Notifier defaults
    pub fn product_name() -> String {
        "course-monitor".into()
    }

    // Storage defaults
    pub fn sections_file() -> String {
        "data/sections.json".into()
    }
    pub fn history_file() -> String {
        "logs/history.csv".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
