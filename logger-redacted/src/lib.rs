//! Logging with automatic patient data redaction for the exam billing engine
//!
//! Uploaded exam spreadsheets carry patient names and, occasionally, personal
//! identifiers typed into free-text columns. Nothing of that kind may reach a
//! log line in clear text. This crate provides:
//!
//! - **Subscriber setup**: `tracing-subscriber` with `EnvFilter`, plain or JSON
//!   output, optional daily rolling file through `tracing-appender`
//! - **Patient tokens**: [`patient_token`] replaces a patient name with a stable
//!   hash so log lines about one patient can still be correlated
//! - **Free-text scrubbing**: [`PiiRedactor`] masks or hashes e-mails, CPF
//!   numbers and phone numbers
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{patient_token, LoggerConfig};
//!
//! let _guard = logger_redacted::init(&LoggerConfig::default())?;
//! tracing::info!(patient = %patient_token("João da Silva"), "Exam priced");
//! # Ok::<(), logger_redacted::LoggerError>(())
//! ```

pub mod config;
pub mod redactor;
pub mod subscriber;

pub use config::*;
pub use redactor::*;
pub use subscriber::*;
