//! Vault Core
//!
//! Orchestrates one batch pass over a vault snapshot: person index first,
//! then task categorization, link scanning and repair.
//!
//! # Core Concepts
//!
//! - [`VaultConfig`]: TOML configuration with `VAULT_ROOT` override
//! - [`VaultPass`]: store + config + worker pool; one method per operation
//! - [`RunDeadline`]: whole-run timeout, checked before each document
//! - Reports: engine result plus [`Diagnostics`](vault_model::Diagnostics)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vault_core::{VaultConfig, VaultPass};
//! use vault_store::MemoryDocumentStore;
//!
//! let store: MemoryDocumentStore = [
//!     ("Jane Doe.md", "---\nname: Jane Doe\n---\n"),
//!     ("Inbox.md", "Call [[Jane Doe]]"),
//! ]
//! .into_iter()
//! .collect();
//! let pass = VaultPass::new(Arc::new(store), VaultConfig::new()).unwrap();
//! let report = pass.check().unwrap();
//! assert!(!report.has_errors());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod deadline;
mod discovery;
mod error;
mod pass;

pub use config::{ConfigError, VaultConfig, VAULT_ROOT_ENV};
pub use deadline::RunDeadline;
pub use discovery::is_person_document;
pub use error::{Result, VaultError};
pub use pass::{
    CheckReport, GtdReport, LinkReport, PeopleReport, RepairReport, RewrittenDocument, VaultPass,
};

/// Commonly used items
pub mod prelude {
    pub use crate::{VaultConfig, VaultError, VaultPass};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
