//! Raw and processed task records
//!
//! [`RawTask`] is what the reminders bridge hands over; [`ProcessedTask`] is
//! the GTD view derived from it.

use crate::person::PersonRecord;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Unprocessed reminder as supplied by the task source
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawTask {
    /// Opaque external identifier
    pub id: String,
    /// Title, possibly carrying `#tag`, `@context`, `!` markup and names
    pub title: String,
    /// Source list name
    #[serde(default)]
    pub list: String,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
    /// Due timestamp
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    /// Whether the reminder is done
    #[serde(default)]
    pub completed: bool,
    /// Whether the reminder is flagged
    #[serde(default)]
    pub flagged: bool,
}

impl RawTask {
    /// Create an open task with the given id and title
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// With list name
    #[inline]
    #[must_use]
    pub fn with_list(mut self, list: impl Into<String>) -> Self {
        self.list = list.into();
        self
    }

    /// With due timestamp
    #[inline]
    #[must_use]
    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }

    /// Mark completed
    #[inline]
    #[must_use]
    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

/// Task priority derived from `!` markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// `!!` present
    High,
    /// single `!` present
    Medium,
    /// no marker
    Normal,
}

impl Priority {
    /// Lower-case name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Normal => "normal",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GTD bucket of a task
///
/// Variant order is the categorization precedence: the first applicable
/// bucket wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Done; overrides any tag
    Completed,
    /// `#inbox`: not yet triaged
    Inbox,
    /// `#next`: actionable now
    Next,
    /// `#waiting`: delegated / blocked on someone
    Waiting,
    /// `#someday`: deferred
    Someday,
    /// no GTD tag
    NoTag,
}

impl TaskStatus {
    /// All statuses in precedence order
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Completed,
        TaskStatus::Inbox,
        TaskStatus::Next,
        TaskStatus::Waiting,
        TaskStatus::Someday,
        TaskStatus::NoTag,
    ];

    /// Tag that selects this status, if any
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            TaskStatus::Inbox => Some("inbox"),
            TaskStatus::Next => Some("next"),
            TaskStatus::Waiting => Some("waiting"),
            TaskStatus::Someday => Some("someday"),
            TaskStatus::Completed | TaskStatus::NoTag => None,
        }
    }

    /// Snake-case name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Inbox => "inbox",
            TaskStatus::Next => "next",
            TaskStatus::Waiting => "waiting",
            TaskStatus::Someday => "someday",
            TaskStatus::NoTag => "no_tag",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GTD view of a [`RawTask`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedTask {
    pub id: String,
    /// Title with markup removed and people linked
    pub clean_title: String,
    /// Title as received
    pub original_title: String,
    /// `#tags` in first-seen order
    pub tags: IndexSet<String>,
    /// `@contexts` in first-seen order
    pub contexts: IndexSet<String>,
    pub priority: Priority,
    /// People recognized in the title, left to right
    pub linked_people: Vec<Arc<PersonRecord>>,
    pub status: TaskStatus,
    pub due: Option<DateTime<Utc>>,
    /// `due` came from the title text rather than the source
    #[serde(default)]
    pub due_inferred: bool,
    pub list: String,
    pub notes: String,
    pub flagged: bool,
}

impl ProcessedTask {
    /// Whether the task is still open
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status != TaskStatus::Completed
    }

    /// Canonical names of linked people, in order
    pub fn linked_names(&self) -> impl Iterator<Item = &str> {
        self.linked_people.iter().map(|p| p.canonical_name.as_str())
    }
}
