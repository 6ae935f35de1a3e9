//! Vault Store
//!
//! Document store adapter: the only layer that touches the filesystem.
//!
//! # Core Concepts
//!
//! - [`DocumentStore`]: list, read and write vault documents
//! - [`FsDocumentStore`]: directory-backed store with per-path write locks
//! - [`MemoryDocumentStore`]: in-memory store
//! - [`FileProbe`] / [`VaultFileSet`]: existence checks for link resolution
//! - [`parse_frontmatter`]: structured preamble parsing

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod frontmatter;
mod fs;
mod memory;
mod store;

pub use error::{FrontmatterError, StoreError};
pub use frontmatter::{body, parse_frontmatter, value_type_name, Frontmatter};
pub use fs::{FsDocumentStore, DEFAULT_EXCLUDE_DIRS};
pub use memory::MemoryDocumentStore;
pub use store::{CachedProbe, DocumentStore, FileProbe, VaultFileSet};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
