//! Vault Links
//!
//! Link graph integrity engine: extracts every cross-document reference,
//! resolves it against the vault and rewrites moved targets.
//!
//! # Core Concepts
//!
//! - **Extraction**: `![[embed]]`, `[[wikilink|alias]]` and `[label](target)`
//!   in order of occurrence, with byte spans for rewriting
//! - **Resolution**: external, valid, missing or outside the vault, probed
//!   through [`FileProbe`](vault_store::FileProbe)
//! - **Repair**: an explicit `{old -> new}` [`RepairMap`], applied
//!   idempotently
//! - **Graph**: outgoing references, backlinks and resolution counts

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod extract;
mod graph;
mod repair;
mod resolve;

pub use error::RepairMapError;
pub use extract::extract_references;
pub use graph::{LinkGraph, ResolutionCounts};
pub use repair::{apply_repairs, RepairChange, RepairMap};
pub use resolve::{
    annotate_person, broken_diagnostic, find_broken, resolve, scan_document, scan_links,
};

/// Commonly used items
pub mod prelude {
    pub use crate::{apply_repairs, extract_references, resolve, scan_links, LinkGraph, RepairMap};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
