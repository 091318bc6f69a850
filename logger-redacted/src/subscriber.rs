use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggerConfig;
use crate::redactor::{PiiRedactor, RedactionConfig};

const LOG_FILE_PREFIX: &str = "laudos.log";

static REDACTOR: OnceLock<Option<PiiRedactor>> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`. When a log directory
/// is configured the returned guard must be held until shutdown so buffered
/// lines are flushed.
pub fn init(config: &LoggerConfig) -> Result<Option<WorkerGuard>, LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| LoggerError::InvalidFilter {
            directive: config.log_level.clone(),
            message: e.to_string(),
        })?,
    };

    let redactor = config
        .redaction_enabled
        .then(|| PiiRedactor::new(RedactionConfig::default()));
    // A second init keeps the first redactor; the subscriber install below reports the error.
    let _ = REDACTOR.set(redactor);

    let (writer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (fmt::writer::BoxMakeWriter::new(writer), Some(guard))
        }
        None => (fmt::writer::BoxMakeWriter::new(std::io::stderr), None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry
            .with(fmt::layer().json().with_target(false).with_writer(writer))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(writer))
            .try_init()
    };
    installed.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;

    Ok(guard)
}

/// Redacts free text with the redactor configured by [`init`].
///
/// Before initialization, or when redaction is disabled, text is returned unchanged.
pub fn scrub(text: &str) -> String {
    match REDACTOR.get() {
        Some(Some(redactor)) => redactor.redact(text),
        _ => text.to_string(),
    }
}
