use std::collections::HashMap;
use std::path::{Path, PathBuf};

use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Base name of the settings file looked up in the working directory
/// (`laudos.yaml`, `laudos.toml` or `laudos.json`).
pub const DEFAULT_SETTINGS_NAME: &str = "laudos";

/// Prefix of environment overrides, e.g. `LAUDOS__PENDING_UPLOAD_POLICY=replace`.
pub const ENV_PREFIX: &str = "LAUDOS";

/// What happens when a new upload arrives while another is still awaiting
/// resolution of unknown exam types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingUploadPolicy {
    /// Refuse the new upload; the pending one must be saved or cancelled first
    #[default]
    Reject,
    /// Drop the pending upload and evaluate the new one
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingSettings {
    /// Specialist name recorded for rows that carry none
    pub unspecified_specialist: String,
    /// Category preselected for every unknown exam type
    pub suggested_category: String,
    pub pending_upload_policy: PendingUploadPolicy,
    pub logging: LoggerConfig,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            unspecified_specialist: "Não especificado".to_string(),
            suggested_category: "2D Total".to_string(),
            pending_upload_policy: PendingUploadPolicy::Reject,
            logging: LoggerConfig::default(),
        }
    }
}

impl BillingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.unspecified_specialist.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "unspecified_specialist must not be empty".to_string(),
            ));
        }
        if self.suggested_category.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "suggested_category must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Layered settings loader: defaults, then a settings file, then environment
#[derive(Debug, Default)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads this file instead of the optional `laudos.*` in the working directory.
    /// An explicit file must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Uses this map instead of the process environment.
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    pub fn load(self) -> Result<BillingSettings> {
        let mut builder = config::Config::builder();

        builder = match &self.file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::SourceNotFound(path.clone()));
                }
                builder.add_source(config::File::from(path.as_path()))
            }
            None => builder.add_source(config::File::with_name(DEFAULT_SETTINGS_NAME).required(false)),
        };

        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .source(self.env.map(|vars| vars.into_iter().collect()));
        builder = builder.add_source(environment);

        let settings: BillingSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        debug!(
            policy = ?settings.pending_upload_policy,
            suggested_category = %settings.suggested_category,
            "Billing settings loaded"
        );
        Ok(settings)
    }
}
