/// Structured logging for the risk-communication registry
///
/// Every entry carries the emitting component and, where relevant, the id
/// of the alert, record or message involved. Entries are emitted through
/// `tracing`; `init_logger` installs a `tracing-subscriber` formatter for
/// console or file output.

use std::fmt;
use std::fs::OpenOptions;
use std::str::FromStr;
use std::sync::Mutex;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::model::{DispatchFailure, RegistryError, ValidationError};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(rename = "warn", alias = "warning")]
    Warning,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(ValidationError::UnknownValue {
                kind: "log level",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Store,
    Dispatch,
    Session,
    Config,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Store => write!(f, "STORE"),
            Component::Dispatch => write!(f, "DISPATCH"),
            Component::Session => write!(f, "SESSION"),
            Component::Config => write!(f, "CONFIG"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - carrier drop within the configured success rate, or operator cancellation
    Expected,
    /// Unexpected failure - provider misconfiguration or outage
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
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

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `min_level` when set. With `log_file` the output is
/// appended to that file without ANSI colouring. Calling this twice keeps
/// the first subscriber.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> Result<(), RegistryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.as_filter()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| RegistryError::LogFile {
                    path: path.to_string(),
                    source,
                })?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None if console_timestamps => builder.try_init(),
        None => builder.without_time().try_init(),
    };

    if installed.is_err() {
        debug(Component::System, None, "logger already initialised, keeping existing subscriber");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(component: Component, entity_id: Option<&str>, message: &str) {
    tracing::info!(component = %component, entity = entity_id.unwrap_or("-"), "{}", message);
}

/// Log a warning message
pub fn warn(component: Component, entity_id: Option<&str>, message: &str) {
    tracing::warn!(component = %component, entity = entity_id.unwrap_or("-"), "{}", message);
}

/// Log an error message
pub fn error(component: Component, entity_id: Option<&str>, message: &str) {
    tracing::error!(component = %component, entity = entity_id.unwrap_or("-"), "{}", message);
}

/// Log a debug message
pub fn debug(component: Component, entity_id: Option<&str>, message: &str) {
    tracing::debug!(component = %component, entity = entity_id.unwrap_or("-"), "{}", message);
}

// ---------------------------------------------------------------------------
// Dispatch Failure Logging
// ---------------------------------------------------------------------------

/// Classify a dispatch failure for log severity.
pub fn classify_dispatch_failure(failure: &DispatchFailure) -> FailureType {
    match failure {
        DispatchFailure::Undelivered | DispatchFailure::Cancelled => FailureType::Expected,
        DispatchFailure::Rejected { .. } => FailureType::Unexpected,
        DispatchFailure::Provider { reason, .. } => {
            let reason = reason.to_ascii_lowercase();
            if reason.contains("timeout") || reason.contains("offline") {
                FailureType::Unknown
            } else {
                FailureType::Unexpected
            }
        }
    }
}

/// Log a dispatch failure with automatic classification
pub fn log_dispatch_failure(message_id: &str, failure: &DispatchFailure) {
    let failure_type = classify_dispatch_failure(failure);
    let message = format!("dispatch failed [{}]: {}", failure_type, failure);

    match failure_type {
        FailureType::Expected => debug(Component::Dispatch, Some(message_id), &message),
        FailureType::Unexpected => error(Component::Dispatch, Some(message_id), &message),
        FailureType::Unknown => warn(Component::Dispatch, Some(message_id), &message),
    }
}

/// Log the outcome of a batch of dispatches
pub fn log_dispatch_summary(total: usize, delivered: usize, failed: usize) {
    let message = format!(
        "Dispatch batch complete: {}/{} delivered, {} failed",
        delivered, total, failed
    );

    if failed == 0 {
        info(Component::Dispatch, None, &message);
    } else if delivered == 0 {
        error(Component::Dispatch, None, &message);
    } else {
        warn(Component::Dispatch, None, &message);
    }
}
