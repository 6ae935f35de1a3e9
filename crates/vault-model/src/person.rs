//! Canonical person identity

use crate::path::VaultPath;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Canonical identity of one person, built from their person page
///
/// Records are owned by the person index and shared read-only with the
/// engines that consume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Display name and unique key
    pub canonical_name: String,
    /// Declared aliases, in declaration order (canonical name not repeated)
    pub aliases: IndexSet<String>,
    /// Lower-cased, syntax-checked email addresses
    pub emails: IndexSet<String>,
    /// Owning person page
    pub page_path: VaultPath,
    /// Reminders list bound to this person (`reminders.listName`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders_list: Option<String>,
    /// Legacy `personId` key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
}

impl PersonRecord {
    /// Create record with no aliases or emails
    #[inline]
    #[must_use]
    pub fn new(canonical_name: impl Into<String>, page_path: VaultPath) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            aliases: IndexSet::new(),
            emails: IndexSet::new(),
            page_path,
            reminders_list: None,
            person_id: None,
        }
    }

    /// With an additional alias (ignored if equal to the canonical name)
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if alias != self.canonical_name {
            self.aliases.insert(alias);
        }
        self
    }

    /// With an additional email (stored lower-cased)
    #[must_use]
    pub fn with_email(mut self, email: impl AsRef<str>) -> Self {
        self.emails.insert(email.as_ref().to_lowercase());
        self
    }

    /// Every name this person answers to: the canonical name first, then aliases
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether `email` (any case) belongs to this person
    #[must_use]
    pub fn has_email(&self, email: &str) -> bool {
        self.emails.contains(&email.to_lowercase())
    }

    /// Wikilink text pointing at this person's page
    #[inline]
    #[must_use]
    pub fn wikilink(&self) -> String {
        format!("[[{}]]", self.canonical_name)
    }
}
