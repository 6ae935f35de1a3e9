//! Error types for task ingestion

use std::path::PathBuf;

/// Errors while loading raw tasks
#[derive(Debug, thiserror::Error)]
pub enum GtdError {
    /// Cache file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache is not valid JSON of the expected shape
    #[error("invalid reminders cache: {0}")]
    Json(#[from] serde_json::Error),
}

impl GtdError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
