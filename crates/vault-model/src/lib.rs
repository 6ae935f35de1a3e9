//! Vault Model
//!
//! Shared data model for the vault integrity engines.
//!
//! # Core Concepts
//!
//! - [`VaultPath`]: normalized path that cannot leave the vault root
//! - [`Document`]: one text file, the source of truth
//! - [`PersonRecord`]: canonical identity of a person
//! - [`RawTask`] / [`ProcessedTask`]: reminder before and after GTD parsing
//! - [`LinkReference`]: one cross-document reference and its resolution
//! - [`Diagnostics`]: non-fatal findings returned next to every result

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod diagnostic;
mod document;
mod hash;
mod link;
mod path;
mod person;
mod task;

pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use document::{Document, DocumentKind};
pub use hash::ContentHash;
pub use link::{LinkKind, LinkReference, Resolution, TargetType};
pub use path::{PathError, VaultPath};
pub use person::PersonRecord;
pub use task::{Priority, ProcessedTask, RawTask, TaskStatus};

/// Commonly used types
pub mod prelude {
    pub use crate::{
        Diagnostic, DiagnosticKind, Diagnostics, Document, DocumentKind, LinkKind, LinkReference,
        PersonRecord, Priority, ProcessedTask, RawTask, Resolution, Severity, TaskStatus,
        VaultPath,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
