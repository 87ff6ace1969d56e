//! Unified logging system
//!
//! Structured logging on top of `tracing-subscriber` with configurable output.

use serde::{Deserialize, Serialize};
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Log file path; logs go to stderr when unset
    pub log_file_path: Option<String>,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            log_file_path: None,
            filter_directives: Vec::new(),
        }
    }
}

impl LoggingConfig {
    /// Verbose preset: debug output for the staybook crates
    pub fn verbose() -> Self {
        Self {
            level: "info".to_string(),
            include_location: true,
            filter_directives: vec![
                "staybook_core=debug".to_string(),
                "staybook_api=debug".to_string(),
                "staybook_session=debug".to_string(),
                "staybook=debug".to_string(),
            ],
            ..Default::default()
        }
    }
}

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `config.level` when set.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    for directive in &config.filter_directives {
        filter = filter.add_directive(directive.parse()?);
    }

    let registry = tracing_subscriber::registry().with(filter);

    match (config.format, &config.log_file_path) {
        (LogFormat::Pretty, Some(path)) => {
            let file = open_log_file(path)?;
            let layer = fmt::layer()
                .pretty()
                .with_ansi(false)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(file);
            registry.with(layer).try_init()?;
        }
        (LogFormat::Pretty, None) => {
            let layer = fmt::layer()
                .pretty()
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(io::stderr);
            registry.with(layer).try_init()?;
        }
        (LogFormat::Compact, Some(path)) => {
            let file = open_log_file(path)?;
            let layer = fmt::layer()
                .compact()
                .with_ansi(false)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(file);
            registry.with(layer).try_init()?;
        }
        (LogFormat::Compact, None) => {
            let layer = fmt::layer()
                .compact()
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(io::stderr);
            registry.with(layer).try_init()?;
        }
    }

    Ok(())
}

fn open_log_file(path: &str) -> io::Result<std::sync::Mutex<std::fs::File>> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(std::sync::Mutex::new)
}
