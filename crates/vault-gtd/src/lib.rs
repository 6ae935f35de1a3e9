//! Vault GTD
//!
//! GTD categorization engine: turns raw reminder titles into structured
//! tasks and links the people they mention.
//!
//! # Overview
//!
//! - **Scanners**: `#tags`, `@contexts`, `!`/`!!` priority, markup stripping
//! - **Linker**: longest-alias-first person linking against a [`PersonIndex`]
//! - **Categorizer**: status precedence, optional due-date inference
//! - **Board**: status buckets, urgent list, context view
//!
//! [`PersonIndex`]: vault_people::PersonIndex

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod board;
mod categorize;
mod due;
mod error;
mod linker;
mod reminders;
mod scan;

pub use board::{GtdBoard, GtdSummary};
pub use categorize::{
    categorize, categorize_all, due_order, group_by_context, sort_by_due_date, status_for,
    Categorizer,
};
pub use due::{days_until, infer_due};
pub use error::GtdError;
pub use linker::{link_people, unlinkable_people};
pub use reminders::{parse_due, RemindersCache};
pub use scan::{has_markup, scan_contexts, scan_priority, scan_tags, strip_markup};

/// Commonly used items
pub mod prelude {
    pub use crate::{categorize, categorize_all, Categorizer, GtdBoard, RemindersCache};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
