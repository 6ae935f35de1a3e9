//! Error types for a vault pass

use crate::config::ConfigError;
use std::path::PathBuf;
use vault_gtd::GtdError;
use vault_links::RepairMapError;
use vault_store::StoreError;

/// Fatal errors of a vault pass
///
/// Per-document problems are diagnostics, never errors.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// No readable documents at all
    #[error("no readable documents in vault {0}")]
    EmptyVault(PathBuf),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("repair map error: {0}")]
    RepairMap(#[from] RepairMapError),

    #[error("task ingestion error: {0}")]
    Gtd(#[from] GtdError),

    /// Worker pool could not be started
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result alias for vault passes
pub type Result<T> = std::result::Result<T, VaultError>;
