use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid content in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported file format: {0} (expected .csv, .json, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    #[error("{0} has no data rows")]
    EmptyFile(PathBuf),

    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

pub type OpsResult<T> = Result<T, OpsError>;
