//! Structured logging setup for dockerfile-ai
//!
//! Built on `tracing`: a stderr console layer (pretty or JSON), an optional
//! plain-text file layer, and `RUST_LOG` filtering on top of the configured
//! level. Logs never go to stdout, which carries the analysis output and the
//! MCP stdio transport.
//!
//! # Example
//!
//! ```no_run
//! use dockerfile_ai::util::logging;
//!
//! logging::with_level("debug");
//!
//! use tracing::{info, warn};
//! info!("Application started");
//! warn!(file = "Dockerfile", "No corrected Dockerfile found");
//! ```

use crate::config::LogSettings;
use std::env;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

pub const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format on stderr
    pub use_json: bool,

    /// Include the module target (e.g., dockerfile_ai::inference) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,

    /// Also append plain-text logs to this file
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
            log_file: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Adds a log file destination
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Level and optional file from the `logging` section of the config
    pub fn from_settings(settings: &LogSettings) -> Self {
        Self {
            level: parse_level(&settings.level),
            log_file: settings.log_file.clone(),
            ..Default::default()
        }
    }
}

/// Parses a log level from a string
///
/// Falls back to `Level::INFO` with a note on stderr when the name is unknown.
///
/// ```
/// use dockerfile_ai::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: {}",
                level_str,
                VALID_LEVELS.join(", ")
            );
            Level::INFO
        }
    }
}

pub fn is_valid_level(level_str: &str) -> bool {
    let lower = level_str.to_lowercase();
    lower == "warning" || VALID_LEVELS.contains(&lower.as_str())
}

fn directive(text: &str) -> Option<Directive> {
    text.parse().ok()
}

fn build_filter(level: Level) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    if let Some(d) = directive(&format!("dockerfile_ai={}", level)) {
        filter = filter.add_directive(d);
    }

    // Quiet the HTTP stack unless RUST_LOG asks otherwise
    if env::var("RUST_LOG").is_err() {
        for noisy in ["h2=warn", "hyper=warn", "hyper_util=warn", "reqwest=warn"] {
            if let Some(d) = directive(noisy) {
                filter = filter.add_directive(d);
            }
        }
    }
    filter
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initializes the logging system; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        let file_layer = config.log_file.as_deref().and_then(|path| {
            match open_log_file(path) {
                Ok(file) => Some(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(config.include_target),
                ),
                Err(e) => {
                    eprintln!("Cannot open log file {}: {}", path.display(), e);
                    None
                }
            }
        });

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

/// Initializes logging with a specific log level from string
pub fn with_level(level_str: &str) {
    init_logging(LoggingConfig::with_level(parse_level(level_str)));
}
