//! Run configuration
//!
//! Loaded from TOML, overridden by `VAULT_ROOT`, then by CLI flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vault_model::{PathError, VaultPath};
use vault_people::{PreambleValidator, DEFAULT_DEPRECATED_TAGS};
use vault_store::DEFAULT_EXCLUDE_DIRS;

/// Environment variable overriding [`VaultConfig::vault_root`]
pub const VAULT_ROOT_ENV: &str = "VAULT_ROOT";

/// Errors loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML of the expected shape
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `people_dir` is not a vault-relative path
    #[error("invalid people_dir `{raw}`: {source}")]
    InvalidPeopleDir {
        raw: String,
        #[source]
        source: PathError,
    },
}

/// Settings for one vault pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault root directory
    pub vault_root: PathBuf,
    /// People directory relative to the root; empty for the root itself
    pub people_dir: String,
    /// Directory names (or root-relative paths) never scanned
    pub exclude_dirs: Vec<String>,
    /// Worker threads; 0 uses the rayon default
    pub worker_threads: usize,
    /// Whole-run deadline in seconds; 0 disables it
    pub run_timeout_secs: u64,
    /// Infer missing due dates from task titles
    pub infer_due_dates: bool,
    pub deprecated_tags: Vec<String>,
}

impl VaultConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With vault root
    #[inline]
    #[must_use]
    pub fn with_vault_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.vault_root = root.into();
        self
    }

    /// With people directory
    #[inline]
    #[must_use]
    pub fn with_people_dir(mut self, dir: impl Into<String>) -> Self {
        self.people_dir = dir.into();
        self
    }

    /// With excluded directories
    #[inline]
    #[must_use]
    pub fn with_exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.exclude_dirs = dirs;
        self
    }

    /// With worker thread count
    #[inline]
    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// With run timeout in seconds
    #[inline]
    #[must_use]
    pub fn with_run_timeout_secs(mut self, secs: u64) -> Self {
        self.run_timeout_secs = secs;
        self
    }

    /// With due-date inference toggled
    #[inline]
    #[must_use]
    pub fn with_due_inference(mut self, enabled: bool) -> Self {
        self.infer_due_dates = enabled;
        self
    }

    /// With deprecated tag list
    #[must_use]
    pub fn with_deprecated_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deprecated_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Parse TOML; missing keys take their defaults
    ///
    /// # Errors
    /// Returns error on invalid TOML or wrongly typed keys.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply an explicit root override (the value of `VAULT_ROOT`)
    #[must_use]
    pub fn with_root_override(mut self, root: Option<String>) -> Self {
        if let Some(root) = root.filter(|r| !r.trim().is_empty()) {
            self.vault_root = PathBuf::from(root);
        }
        self
    }

    /// Apply environment overrides
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_root_override(std::env::var(VAULT_ROOT_ENV).ok())
    }

    /// People directory as a vault path; `None` for the vault root
    ///
    /// # Errors
    /// Returns error if `people_dir` escapes the root or is absolute.
    pub fn people_dir_path(&self) -> Result<Option<VaultPath>, ConfigError> {
        let raw = self.people_dir.trim();
        match VaultPath::normalize(raw) {
            Ok(path) => Ok(Some(path)),
            Err(PathError::Empty) => Ok(None),
            Err(source) => Err(ConfigError::InvalidPeopleDir {
                raw: raw.to_string(),
                source,
            }),
        }
    }

    /// Run deadline as a duration
    #[inline]
    #[must_use]
    pub fn run_timeout(&self) -> Option<Duration> {
        (self.run_timeout_secs > 0).then(|| Duration::from_secs(self.run_timeout_secs))
    }

    /// Preamble validator for person pages
    #[must_use]
    pub fn validator(&self) -> PreambleValidator {
        PreambleValidator::new().with_deprecated_tags(self.deprecated_tags.iter().cloned())
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            vault_root: PathBuf::from("."),
            people_dir: String::new(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(ToString::to_string).collect(),
            worker_threads: 0,
            run_timeout_secs: 0,
            infer_due_dates: false,
            deprecated_tags: DEFAULT_DEPRECATED_TAGS.iter().map(ToString::to_string).collect(),
        }
    }
}
