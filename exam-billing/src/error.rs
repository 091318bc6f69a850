use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown exam category: {0}")]
    UnknownCategory(String),

    #[error("No pending upload is awaiting resolution")]
    NoPendingBatch,

    #[error("An upload is already awaiting resolution of {pending} exam type(s)")]
    ResolutionInProgress { pending: usize },

    #[error("Missing category for exam type(s): {}", .0.join(", "))]
    MissingResolution(Vec<String>),

    #[error("Exam type(s) not awaiting resolution: {}", .0.join(", "))]
    UnexpectedResolution(Vec<String>),

    #[error("Mapping store error: {0}")]
    Store(String),
}

impl From<config_engine::ConfigError> for BillingError {
    fn from(err: config_engine::ConfigError) -> Self {
        BillingError::Config(err.to_string())
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
