//! Course Monitor CLI
//!
//! Runs the monitoring loop locally, or a single pass for testing.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use course_monitor::{
    error::Result,
    models::Config,
    pipeline,
    storage::{JsonSectionStore, SectionStore},
};
use tokio_util::sync::CancellationToken;

/// course-monitor - Course Seat Availability Monitor
#[derive(Parser, Debug)]
#[command(
    name = "course-monitor",
    version,
    about = "Watches course sections and alerts when seats open"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run monitoring passes on the configured interval until Ctrl-C
    Run,

    /// Run a single monitoring pass
    Once,

    /// List monitored sections.
    ///
    /// Discovered sections are stored disabled unless
    /// `monitor.enable_discovered` is set. To start watching one, set its
    /// `enabled` field to `true` in the sections file and restart.
    List,

    /// Validate the configuration file
    Validate,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Cancel the token on Ctrl-C.
fn shutdown_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Shutdown requested, finishing current course...");
            token.cancel();
        }
    });
    cancel
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = Config::load_or_default(&cli.config);
    let level = match &loaded {
        Ok(config) => config.logging.level.clone(),
        Err(_) => "info".to_string(),
    };
    init_logging(cli.verbose, &level);

    if let Command::Init { force } = cli.command {
        return init_config(&cli.config, force);
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load config from {}: {}", cli.config.display(), e);
            return Err(e);
        }
    };
    if !cli.config.exists() {
        log::warn!("No config at {}. Using defaults.", cli.config.display());
    }

    match cli.command {
        Command::Run => {
            log::info!("course-monitor starting...");
            let cancel = shutdown_on_ctrl_c();
            let passes = pipeline::run_scheduler(&config, cancel).await?;
            log::info!("Stopped after {} pass(es)", passes);
        }

        Command::Once => {
            let cancel = shutdown_on_ctrl_c();
            let summary = pipeline::run_once(&config, &cancel).await?;
            log::info!(
                "Courses: {} total, {} reconciled, {} failed",
                summary.courses_total,
                summary.courses_reconciled,
                summary.courses_failed
            );
            log::info!(
                "Sections: {} observed, {} created, {} updated, {} open alert(s), {} waitlist alert(s)",
                summary.sections.observed,
                summary.sections.created,
                summary.sections.updated,
                summary.sections.open_alerts,
                summary.sections.waitlist_alerts
            );
        }

        Command::List => {
            let store = JsonSectionStore::new(&config.storage.sections_file);
            let mut sections = store.find_all().await?;
            sections.sort_by(|a, b| {
                a.course_id
                    .cmp(&b.course_id)
                    .then_with(|| a.section_id.cmp(&b.section_id))
            });

            if sections.is_empty() {
                log::info!("No sections in {}", config.storage.sections_file);
            }
            for s in &sections {
                println!(
                    "{:<8} {:<10} {:<24} {:<10} {}",
                    if s.enabled { "enabled" } else { "disabled" },
                    s.section_id,
                    s.course_display_name,
                    s.course_id,
                    s.last_status.map_or("-", |st| st.as_str())
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            let config = Config::load(&cli.config).and_then(|c| c.validate().map(|_| c));
            if let Err(e) = config {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Init { .. } => {}
    }

    Ok(())
}

/// Write the default configuration unless a file already exists.
fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        log::warn!(
            "Config already exists at {}. Use --force to overwrite.",
            path.display()
        );
        return Ok(());
    }
    Config::default().save(path)?;
    log::info!("Default configuration written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_help_explains_enabling_sections() {
        let cmd = Cli::command();
        let list = cmd.find_subcommand("list").unwrap();
        let help = list.get_long_about().unwrap().to_string();
        assert!(help.contains("enable_discovered"));
        assert!(help.contains("`enabled`"));
    }

    #[test]
    fn validate_parses_subcommand() {
        let cli =
            Cli::try_parse_from(["course-monitor", "--config", "x.toml", "validate"]).unwrap();
        assert!(matches!(cli.command, Command::Validate));
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }
}
