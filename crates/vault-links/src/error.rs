//! Error types for repair maps

use std::path::PathBuf;
use vault_model::PathError;

/// Errors loading or validating a repair map
#[derive(Debug, thiserror::Error)]
pub enum RepairMapError {
    /// Map file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Map is not valid TOML or JSON of the expected shape
    #[error("invalid repair map: {0}")]
    Parse(String),

    /// Key or value is not a vault-relative path
    #[error("invalid path in repair map `{raw}`: {source}")]
    InvalidPath {
        raw: String,
        #[source]
        source: PathError,
    },

    /// Entry maps a path onto itself
    #[error("repair map entry maps `{0}` to itself")]
    SelfMapping(String),
}

impl RepairMapError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for RepairMapError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for RepairMapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
