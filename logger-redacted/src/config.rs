// Logger configuration
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Default filter directive when `RUST_LOG` is not set
    pub log_level: String,
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
    /// Write to a daily rolling file in this directory instead of stderr
    pub directory: Option<PathBuf>,
    /// Scrub e-mails, CPFs and phone numbers from free text before logging it
    pub redaction_enabled: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            directory: None,
            redaction_enabled: true,
        }
    }
}
