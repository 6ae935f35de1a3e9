//! Testing utilities for the vault workspace
//!
//! Shared fixtures: temporary vaults, person pages and raw tasks.

#![allow(missing_docs)]

use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vault_model::{Document, RawTask, VaultPath};
use vault_people::{build_person_index, PersonIndex};

/// Vault path from a literal
pub fn vault_path(raw: &str) -> VaultPath {
    VaultPath::normalize(raw).unwrap()
}

/// Document from a path literal and content
pub fn document(path: &str, content: &str) -> Document {
    Document::new(vault_path(path), content)
}

/// Midnight UTC on the given day
pub fn utc_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Vault on disk, removed on drop
pub struct TempVault {
    dir: TempDir,
}

impl TempVault {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// With a file at a vault-relative path
    #[must_use]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.write(path, content);
        self
    }

    /// With a person page under `dir` ("" for the root)
    #[must_use]
    pub fn with_person(self, dir: &str, page: &PersonPage) -> Self {
        let path = if dir.is_empty() {
            page.file_name()
        } else {
            format!("{}/{}", dir.trim_end_matches('/'), page.file_name())
        };
        self.with_file(&path, &page.render())
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.path(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.path(path)).unwrap()
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}

impl Default for TempVault {
    fn default() -> Self {
        Self::new()
    }
}

/// Person page builder rendering YAML frontmatter
#[derive(Debug, Clone, Default)]
pub struct PersonPage {
    pub name: String,
    pub aliases: Vec<String>,
    pub emails: Vec<String>,
    pub tags: Vec<String>,
    pub list_name: Option<String>,
    pub body: String,
}

impl PersonPage {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tags: vec!["person".to_string()],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    #[must_use]
    pub fn email(mut self, email: &str) -> Self {
        self.emails.push(email.to_string());
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn list_name(mut self, list: &str) -> Self {
        self.list_name = Some(list.to_string());
        self
    }

    #[must_use]
    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn file_name(&self) -> String {
        format!("{}.md", self.name)
    }

    fn yaml_list(items: &[String]) -> String {
        let quoted: Vec<String> = items.iter().map(|i| format!("\"{i}\"")).collect();
        format!("[{}]", quoted.join(", "))
    }

    /// Full page content
    pub fn render(&self) -> String {
        let mut out = format!("---\nname: \"{}\"\n", self.name);
        if !self.tags.is_empty() {
            out.push_str(&format!("tags: {}\n", Self::yaml_list(&self.tags)));
        }
        if !self.aliases.is_empty() {
            out.push_str(&format!("aliases: {}\n", Self::yaml_list(&self.aliases)));
        }
        if !self.emails.is_empty() {
            out.push_str(&format!("emails: {}\n", Self::yaml_list(&self.emails)));
        }
        if let Some(list) = &self.list_name {
            out.push_str(&format!("reminders:\n  listName: \"{list}\"\n"));
        }
        out.push_str("---\n");
        out.push_str(&self.body);
        out
    }

    /// In-memory document at the vault root
    pub fn document(&self) -> Document {
        document(&self.file_name(), &self.render())
    }
}

/// Index over the given pages; panics on diagnostics
pub fn person_index(pages: &[PersonPage]) -> PersonIndex {
    let documents: Vec<Document> = pages.iter().map(PersonPage::document).collect();
    let (index, diagnostics) = build_person_index(&documents);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    index
}

/// Raw tasks with ids `1..=n` from titles
pub fn raw_tasks(titles: &[&str]) -> Vec<RawTask> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| RawTask::new((i + 1).to_string(), *title))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_page_renders_parseable_frontmatter() {
        let page = PersonPage::new("Jane Doe").alias("Jane").email("Jane@Example.com").list_name("Jane Doe");
        let index = person_index(&[page]);
        let jane = index.find_by_alias("Jane").unwrap();
        assert_eq!(jane.reminders_list.as_deref(), Some("Jane Doe"));
        assert!(index.find_by_email("jane@example.com").is_some());
    }

    #[test]
    fn temp_vault_writes_nested_files() {
        let vault = TempVault::new().with_person("People", &PersonPage::new("Bob"));
        assert!(vault.path("People/Bob.md").is_file());
        assert!(vault.read("People/Bob.md").starts_with("---\nname: \"Bob\""));
    }
}
