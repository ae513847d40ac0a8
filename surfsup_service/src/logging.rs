/// Structured logging for the climate API.
///
/// Installs a `tracing` subscriber with console output and an optional log
/// file, and classifies data-source failures so that expected conditions
/// (bad client input) stay quiet while store outages are loud.
///
/// Every record emitted from this crate carries a `source` field naming the
/// subsystem it came from.

use crate::config::LoggingConfig;
use crate::model::{QueryError, RepositoryError};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt as tfmt, layer::SubscriberExt, util::SubscriberInitExt};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    /// Lower-case form accepted by `EnvFilter` directives.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Database,
    Http,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Database => write!(f, "DB"),
            DataSource::Http => write!(f, "HTTP"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - caller sent bad input, nothing is wrong with the service
    Expected,
    /// Unexpected failure - store outage, schema drift, or a bug
    Unexpected,
    /// Unknown - cannot tell yet whether this needs attention
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a repository failure.
pub fn classify_repository_failure(err: &RepositoryError) -> FailureType {
    match err {
        RepositoryError::Unavailable(_) | RepositoryError::MalformedRow(_) => {
            FailureType::Unexpected
        }
        // Statement timeouts are configured behavior; a burst of them is worth a
        // look but a single one is not an outage.
        RepositoryError::Query(msg) if msg.contains("statement timeout") => FailureType::Unknown,
        RepositoryError::Query(_) => FailureType::Unexpected,
    }
}

/// Classify a failure surfaced by the query layer.
pub fn classify_query_failure(err: &QueryError) -> FailureType {
    match err {
        QueryError::InvalidDate { .. } => FailureType::Expected,
        QueryError::Repository(inner) => classify_repository_failure(inner),
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

fn log_classified(source: DataSource, operation: &str, failure_type: FailureType, message: &str) {
    match failure_type {
        FailureType::Expected => {
            debug!(source = %source, operation, failure = %failure_type, "{}", message)
        }
        FailureType::Unexpected => {
            error!(source = %source, operation, failure = %failure_type, "{}", message)
        }
        FailureType::Unknown => {
            warn!(source = %source, operation, failure = %failure_type, "{}", message)
        }
    }
}

/// Log a repository failure with automatic classification
pub fn log_repository_failure(source: DataSource, operation: &str, err: &RepositoryError) {
    let message = format!("{} failed: {}", operation, err);
    log_classified(source, operation, classify_repository_failure(err), &message);
}

/// Log a query-layer failure with automatic classification
pub fn log_query_failure(source: DataSource, operation: &str, err: &QueryError) {
    let message = format!("{} failed: {}", operation, err);
    log_classified(source, operation, classify_query_failure(err), &message);
}

// ---------------------------------------------------------------------------
// Subscriber Setup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log file path: {0}")]
    InvalidFile(String),
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(level: LogLevel) -> String {
    format!(
        "surfsup_service={level},surfsup={level},tower_http={level}",
        level = level.as_directive()
    )
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured level. When a log file is configured
/// the returned guard must be held for the life of the process, otherwise
/// buffered lines are lost on exit.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config.level)));

    let console = if config.console_timestamps {
        tfmt::layer()
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tfmt::layer()
            .with_target(false)
            .with_level(true)
            .without_time()
            .with_writer(std::io::stderr)
            .compact()
            .boxed()
    };

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let path = Path::new(path);
            let file_name = path
                .file_name()
                .ok_or_else(|| LoggingError::InvalidFile(path.display().to_string()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tfmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()?;

    debug!(source = %DataSource::System, "Logging initialized at level: {}", config.level);
    Ok(guard)
}
