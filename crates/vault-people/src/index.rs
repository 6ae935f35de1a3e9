//! Person identity index
//!
//! Provides [`PersonIndex`], an immutable lookup of canonical people by name,
//! alias and email, built once per run by [`PersonIndexBuilder`].
//!
//! Collisions never overwrite: the first-seen record stays the active match
//! and every later claimant is reported as [`DiagnosticKind::AmbiguousIdentity`].

use crate::validation::{is_valid_email, string_list, PreambleValidator};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vault_model::{Diagnostic, DiagnosticKind, Diagnostics, Document, PersonRecord, VaultPath};
use vault_store::{parse_frontmatter, Frontmatter, FrontmatterError};

/// Immutable person lookup tables
///
/// Records are kept in insertion order; every table maps a key to an index
/// into that list.
#[derive(Debug, Clone, Default)]
pub struct PersonIndex {
    records: Vec<Arc<PersonRecord>>,
    /// canonical name → record
    by_name: IndexMap<String, usize>,
    /// alias (canonical names included) → every record declaring it, first wins
    by_alias: IndexMap<String, Vec<usize>>,
    /// lower-cased email → record
    by_email: IndexMap<String, usize>,
    /// (alias, record) pairs for the active alias matches, longest alias first
    matchers: Vec<(String, usize)>,
}

impl PersonIndex {
    /// Create empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed people
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[Arc<PersonRecord>] {
        &self.records
    }

    /// Record by exact canonical name
    #[must_use]
    pub fn get(&self, canonical_name: &str) -> Option<&Arc<PersonRecord>> {
        self.by_name.get(canonical_name).map(|&i| &self.records[i])
    }

    /// Record owning `email`, compared lower-cased
    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<&Arc<PersonRecord>> {
        self.by_email
            .get(email.trim().to_lowercase().as_str())
            .map(|&i| &self.records[i])
    }

    /// First-indexed record declaring `text` as name or alias (case-sensitive)
    #[must_use]
    pub fn find_by_alias(&self, text: &str) -> Option<&Arc<PersonRecord>> {
        self.by_alias
            .get(text)
            .and_then(|ids| ids.first())
            .map(|&i| &self.records[i])
    }

    /// Every record declaring `text` as name or alias, in insertion order
    #[must_use]
    pub fn find_all_by_alias(&self, text: &str) -> Vec<&Arc<PersonRecord>> {
        self.by_alias
            .get(text)
            .map(|ids| ids.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Union of name and email matches, one entry per person
    ///
    /// Names resolve through the alias table; emails compare lower-cased.
    /// Result order is first match first.
    pub fn find_by_name_or_email<N, E>(&self, names: N, emails: E) -> Vec<Arc<PersonRecord>>
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let mut found: IndexMap<String, Arc<PersonRecord>> = IndexMap::new();
        let by_name = names
            .into_iter()
            .filter_map(|n| self.find_by_alias(n.as_ref()).cloned())
            .collect::<Vec<_>>();
        let by_email = emails
            .into_iter()
            .filter_map(|e| self.find_by_email(e.as_ref()).cloned())
            .collect::<Vec<_>>();
        for record in by_name.into_iter().chain(by_email) {
            found.entry(record.canonical_name.clone()).or_insert(record);
        }
        found.into_values().collect()
    }

    /// Active alias matches, longest first; equal lengths keep index order
    pub fn aliases_longest_first(&self) -> impl Iterator<Item = (&str, &Arc<PersonRecord>)> {
        self.matchers
            .iter()
            .map(|(alias, i)| (alias.as_str(), &self.records[*i]))
    }

    /// Serializable `people.index.json` view
    #[must_use]
    pub fn to_snapshot(&self) -> PeopleSnapshot {
        let people = self
            .records
            .iter()
            .map(|r| {
                let entry = SnapshotEntry {
                    name: r.canonical_name.clone(),
                    page_path: r.page_path.to_string(),
                    aliases: r.aliases.iter().cloned().collect(),
                    emails: r.emails.iter().cloned().collect(),
                    person_id: r.person_id.clone(),
                    reminders: r.reminders_list.clone().map(|list_name| SnapshotReminders { list_name }),
                };
                (r.canonical_name.clone(), entry)
            })
            .collect();
        PeopleSnapshot(people)
    }
}

/// `people.index.json` content, keyed by canonical name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeopleSnapshot(pub IndexMap<String, SnapshotEntry>);

/// One person in a [`PeopleSnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub name: String,
    pub page_path: String,
    pub aliases: Vec<String>,
    pub emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<SnapshotReminders>,
}

/// `reminders` block of a [`SnapshotEntry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotReminders {
    pub list_name: String,
}

/// Builds a [`PersonIndex`] one person page at a time
#[derive(Debug, Default)]
pub struct PersonIndexBuilder {
    index: PersonIndex,
    diagnostics: Diagnostics,
    validator: PreambleValidator,
}

impl PersonIndexBuilder {
    /// Create builder with the default validator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a custom preamble validator
    #[must_use]
    pub fn with_validator(mut self, validator: PreambleValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Parse one person page and index it
    ///
    /// Problems are recorded as diagnostics; the page is skipped only when
    /// its preamble is unusable or it has no `name`.
    pub fn add_document(&mut self, document: &Document) {
        let path = &document.path;
        let fm = match parse_frontmatter(&document.content) {
            Ok(Some(fm)) => fm,
            Ok(None) => {
                self.report(
                    Diagnostic::new(DiagnosticKind::MissingRequiredField, "person page has no frontmatter")
                        .with_path(path.clone())
                        .with_subject("name"),
                );
                return;
            }
            Err(err) => {
                let line = match &err {
                    FrontmatterError::Malformed { line, .. } => *line,
                    FrontmatterError::NotAMapping => None,
                };
                let mut diagnostic =
                    Diagnostic::new(DiagnosticKind::MalformedMetadata, err.to_string()).with_path(path.clone());
                if let Some(line) = line {
                    diagnostic = diagnostic.with_line(line);
                }
                self.report(diagnostic);
                return;
            }
        };

        for diagnostic in self.validator.validate(path, &fm, &document.content) {
            self.report(diagnostic);
        }

        if let Some(record) = self.record_from(path, &fm) {
            self.insert(record);
        }
    }

    fn record_from(&mut self, path: &VaultPath, fm: &Frontmatter) -> Option<PersonRecord> {
        let name = match fm.get("name") {
            Some(value) if value.is_string() => value.as_str().map(str::trim).unwrap_or_default(),
            // wrong type already reported by the validator
            Some(value) if !value.is_null() => return None,
            _ => "",
        };
        if name.is_empty() {
            self.report(
                Diagnostic::new(DiagnosticKind::MissingRequiredField, "person page has no `name`")
                    .with_path(path.clone())
                    .with_subject("name"),
            );
            return None;
        }

        let mut record = PersonRecord::new(name, path.clone());

        for alias in fm.get("aliases").and_then(string_list).unwrap_or_default() {
            let alias = alias.trim();
            if !alias.is_empty() {
                record = record.with_alias(alias);
            }
        }

        for email in fm.get("emails").and_then(string_list).unwrap_or_default() {
            let email = email.trim();
            if is_valid_email(email) {
                record = record.with_email(email);
            } else {
                self.report(
                    Diagnostic::new(DiagnosticKind::InvalidEmail, format!("invalid email `{email}` dropped"))
                        .with_path(path.clone())
                        .with_subject(email),
                );
            }
        }

        record.reminders_list = fm
            .get_path("reminders.listName")
            .and_then(|v| v.as_str())
            .map(ToString::to_string);
        record.person_id = fm.get("personId").and_then(|v| match v {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Some(record)
    }

    /// Insert a record, reporting every collision with an earlier record
    pub fn insert(&mut self, record: PersonRecord) {
        if let Some(&existing) = self.index.by_name.get(&record.canonical_name) {
            let first = &self.index.records[existing];
            let message = format!(
                "canonical name `{}` already used by {}; {} not indexed",
                record.canonical_name, first.page_path, record.page_path
            );
            self.report(
                Diagnostic::new(DiagnosticKind::AmbiguousIdentity, message)
                    .with_path(record.page_path.clone())
                    .with_subject(record.canonical_name.clone()),
            );
            return;
        }

        let id = self.index.records.len();
        self.index.by_name.insert(record.canonical_name.clone(), id);

        for name in record.names() {
            let claimants = self.index.by_alias.entry(name.to_string()).or_default();
            if claimants.contains(&id) {
                continue;
            }
            claimants.push(id);
            if let Some(&first) = claimants.first().filter(|&&first| first != id) {
                let message = format!(
                    "alias `{name}` claimed by {} and {}; keeping {}",
                    self.index.records[first].page_path,
                    record.page_path,
                    self.index.records[first].canonical_name
                );
                self.report(
                    Diagnostic::new(DiagnosticKind::AmbiguousIdentity, message)
                        .with_path(record.page_path.clone())
                        .with_subject(name),
                );
            }
        }

        for email in &record.emails {
            match self.index.by_email.get(email) {
                Some(&first) if first != id => {
                    let message = format!(
                        "email `{email}` claimed by {} and {}; keeping {}",
                        self.index.records[first].page_path,
                        record.page_path,
                        self.index.records[first].canonical_name
                    );
                    self.report(
                        Diagnostic::new(DiagnosticKind::AmbiguousIdentity, message)
                            .with_path(record.page_path.clone())
                            .with_subject(email.clone()),
                    );
                }
                Some(_) => {}
                None => {
                    self.index.by_email.insert(email.clone(), id);
                }
            }
        }

        tracing::debug!(person = %record.canonical_name, page = %record.page_path, "person indexed");
        self.index.records.push(Arc::new(record));
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::AmbiguousIdentity | DiagnosticKind::InvalidEmail => {
                tracing::warn!(kind = %diagnostic.kind, "{}", diagnostic.message);
            }
            _ => tracing::debug!(kind = %diagnostic.kind, "{}", diagnostic.message),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Finish building
    #[must_use]
    pub fn build(mut self) -> (PersonIndex, Diagnostics) {
        let mut matchers: Vec<(String, usize)> = self
            .index
            .by_alias
            .iter()
            .filter_map(|(alias, ids)| ids.first().map(|&i| (alias.clone(), i)))
            .collect();
        // stable: equal lengths keep insertion order
        matchers.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        self.index.matchers = matchers;

        tracing::info!(
            people = self.index.len(),
            diagnostics = self.diagnostics.len(),
            "person index built"
        );
        (self.index, self.diagnostics)
    }
}

/// Build an index from person pages with the default validator
#[must_use]
pub fn build_person_index<'a, I>(documents: I) -> (PersonIndex, Diagnostics)
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut builder = PersonIndexBuilder::new();
    for document in documents {
        builder.add_document(document);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(path: &str, content: &str) -> Document {
        Document::new(VaultPath::normalize(path).unwrap(), content)
    }

    fn person(name: &str, aliases: &[&str], emails: &[&str]) -> Document {
        let mut content = format!("---\nname: {name}\ntags: [person]\n");
        if !aliases.is_empty() {
            content.push_str(&format!("aliases: [{}]\n", aliases.join(", ")));
        }
        if !emails.is_empty() {
            content.push_str(&format!("emails: [{}]\n", emails.join(", ")));
        }
        content.push_str("---\n");
        doc(&format!("{name}.md"), &content)
    }

    #[test]
    fn index_lookup_by_name_alias_email() {
        let docs = [person("Jane Doe", &["Jane", "JD"], &["Jane@Example.com"])];
        let (index, diagnostics) = build_person_index(&docs);
        assert!(diagnostics.is_empty());
        assert_eq!(index.len(), 1);

        let jane = index.get("Jane Doe").unwrap();
        assert!(Arc::ptr_eq(jane, index.find_by_alias("JD").unwrap()));
        assert!(Arc::ptr_eq(jane, index.find_by_alias("Jane Doe").unwrap()));
        assert!(Arc::ptr_eq(jane, index.find_by_email("JANE@example.COM").unwrap()));
        assert!(index.find_by_alias("jane").is_none());
        assert!(index.find_by_email("nobody@example.com").is_none());
    }

    #[test]
    fn shared_alias_is_ambiguous_first_wins() {
        let docs = [person("Jack Ryan", &["J"], &[]), person("Jill Ryan", &["J"], &[])];
        let (index, diagnostics) = build_person_index(&docs);
        assert_eq!(diagnostics.count(DiagnosticKind::AmbiguousIdentity), 1);
        assert_eq!(index.find_by_alias("J").unwrap().canonical_name, "Jack Ryan");

        let all: Vec<_> = index
            .find_all_by_alias("J")
            .into_iter()
            .map(|r| r.canonical_name.as_str())
            .collect();
        assert_eq!(all, vec!["Jack Ryan", "Jill Ryan"]);
    }

    #[test]
    fn shared_email_is_ambiguous_first_wins() {
        let docs = [
            person("Ann", &[], &["team@example.com"]),
            person("Bob", &[], &["TEAM@example.com"]),
        ];
        let (index, diagnostics) = build_person_index(&docs);
        assert_eq!(diagnostics.count(DiagnosticKind::AmbiguousIdentity), 1);
        assert_eq!(index.find_by_email("team@example.com").unwrap().canonical_name, "Ann");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn duplicate_canonical_name_not_indexed() {
        let docs = [
            person("Sam", &[], &[]),
            doc("People/Sam.md", "---\nname: Sam\n---\n"),
        ];
        let (index, diagnostics) = build_person_index(&docs);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("Sam").unwrap().page_path.to_string(), "Sam.md");
        assert_eq!(diagnostics.count(DiagnosticKind::AmbiguousIdentity), 1);
    }

    #[test]
    fn own_duplicates_are_silent() {
        let docs = [person("Sam", &["Sam", "Sammy", "Sammy"], &["s@example.com", "S@example.com"])];
        let (index, diagnostics) = build_person_index(&docs);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let sam = index.get("Sam").unwrap();
        assert_eq!(sam.aliases.len(), 1);
        assert_eq!(sam.emails.len(), 1);
    }

    #[test]
    fn missing_name_and_malformed_are_skipped() {
        let docs = [
            doc("NoName.md", "---\ntags: [person]\n---\n"),
            doc("Broken.md", "---\nname: [unclosed\n---\n"),
            doc("Plain.md", "no frontmatter"),
            person("Kept", &[], &[]),
        ];
        let (index, diagnostics) = build_person_index(&docs);
        assert_eq!(index.len(), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::MissingRequiredField), 2);
        assert_eq!(diagnostics.count(DiagnosticKind::MalformedMetadata), 1);
    }

    #[test]
    fn invalid_email_dropped() {
        let docs = [person("Kim", &[], &["kim@example.com", "not-an-email"])];
        let (index, diagnostics) = build_person_index(&docs);
        assert_eq!(diagnostics.count(DiagnosticKind::InvalidEmail), 1);
        assert_eq!(index.get("Kim").unwrap().emails.len(), 1);
    }

    #[test]
    fn name_or_email_union_collapses_duplicates() {
        let docs = [
            person("Jane Doe", &["Jane"], &["jane@example.com"]),
            person("John Smith", &["John"], &["john@example.com"]),
        ];
        let (index, _) = build_person_index(&docs);
        let found = index.find_by_name_or_email(["Jane", "Nobody"], ["JANE@example.com", "john@example.com"]);
        let names: Vec<_> = found.iter().map(|r| r.canonical_name.as_str()).collect();
        assert_eq!(names, vec!["Jane Doe", "John Smith"]);
        assert!(index.find_by_name_or_email(Vec::<&str>::new(), Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn aliases_sorted_longest_first() {
        let docs = [
            person("John", &[], &[]),
            person("John Smith", &["Johnny"], &[]),
            person("Jane", &[], &[]),
        ];
        let (index, _) = build_person_index(&docs);
        let aliases: Vec<_> = index.aliases_longest_first().map(|(a, _)| a).collect();
        assert_eq!(aliases, vec!["John Smith", "Johnny", "John", "Jane"]);
    }

    #[test]
    fn snapshot_shape() {
        let docs = [doc(
            "Jane Doe.md",
            "---\nname: Jane Doe\naliases: [Jane]\nemails: [jane@example.com]\nreminders:\n  listName: Jane Doe\n---\n",
        )];
        let (index, _) = build_person_index(&docs);
        let json = serde_json::to_value(index.to_snapshot()).unwrap();
        assert_eq!(json["Jane Doe"]["pagePath"], "Jane Doe.md");
        assert_eq!(json["Jane Doe"]["aliases"][0], "Jane");
        assert_eq!(json["Jane Doe"]["reminders"]["listName"], "Jane Doe");
    }

    proptest::proptest! {
        #[test]
        fn email_lookup_ignores_case(local in "[a-z]{1,8}", domain in "[a-z]{1,8}") {
            let email = format!("{local}@{domain}.com");
            let (index, _) = build_person_index(&[person("Jane Doe", &[], &[email.as_str()])]);
            proptest::prop_assert!(index.find_by_email(&email.to_uppercase()).is_some());
            let padded = format!(" {email} ");
            proptest::prop_assert!(index.find_by_email(&padded).is_some());
        }
    }
}
