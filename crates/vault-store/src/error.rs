//! Error types for the document store
//!
//! Provides error handling for:
//! - Listing and reading documents (ingress)
//! - Writing documents back (egress)
//! - Frontmatter parsing

use std::path::PathBuf;
use vault_model::{PathError, VaultPath};

/// Errors raised by a [`DocumentStore`](crate::DocumentStore)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error on a concrete file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document does not exist
    #[error("document not found: {0}")]
    NotFound(VaultPath),

    /// Path cannot be represented inside the vault
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// Vault root is missing or not a directory
    #[error("vault root is not a directory: {0}")]
    InvalidRoot(PathBuf),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors while reading the structured preamble of a document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrontmatterError {
    /// YAML syntax error, or the block is never closed
    #[error("malformed frontmatter: {message}")]
    Malformed {
        message: String,
        /// 1-based line of the problem, when known
        line: Option<u32>,
    },

    /// Block parsed but is a scalar or sequence
    #[error("frontmatter is not a mapping")]
    NotAMapping,
}

impl FrontmatterError {
    /// Create malformed error
    pub fn malformed(message: impl Into<String>, line: Option<u32>) -> Self {
        Self::Malformed {
            message: message.into(),
            line,
        }
    }
}
