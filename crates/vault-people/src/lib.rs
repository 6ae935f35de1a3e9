//! Vault People
//!
//! Person identity index: resolves free-text names, aliases and emails to
//! canonical people.
//!
//! # Example
//!
//! ```rust
//! use vault_model::{Document, VaultPath};
//! use vault_people::build_person_index;
//!
//! let page = Document::new(
//!     VaultPath::normalize("Jane Doe.md").unwrap(),
//!     "---\nname: Jane Doe\naliases: [Jane]\n---\n",
//! );
//! let (index, diagnostics) = build_person_index([&page]);
//! assert!(diagnostics.is_empty());
//! assert_eq!(index.find_by_alias("Jane").unwrap().canonical_name, "Jane Doe");
//! ```

#![warn(missing_docs)]

mod index;
mod validation;

pub use index::{
    build_person_index, PeopleSnapshot, PersonIndex, PersonIndexBuilder, SnapshotEntry,
    SnapshotReminders,
};
pub use validation::{is_valid_email, PreambleValidator, DEFAULT_DEPRECATED_TAGS};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for person lookups
    pub use crate::{build_person_index, PersonIndex, PersonIndexBuilder, PreambleValidator};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
