//! Repair maps and link rewriting
//!
//! A [`RepairMap`] is the versionable `{old -> new}` moves table. Applying it
//! rewrites only the target portion of matching references, so link kind,
//! display alias and heading fragment survive the edit.

use crate::error::RepairMapError;
use crate::extract::extract_references;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;
use vault_model::{Document, LinkKind, VaultPath};

/// Validated `{old -> new}` path table, iterated in key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RepairMap {
    moves: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct MovesFile {
    #[serde(default)]
    moves: BTreeMap<String, String>,
}

fn validated(raw: &str) -> Result<String, RepairMapError> {
    VaultPath::normalize(raw)
        .map(|_| raw.to_string())
        .map_err(|source| RepairMapError::InvalidPath {
            raw: raw.to_string(),
            source,
        })
}

impl RepairMap {
    /// Create an empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one move
    ///
    /// # Errors
    /// Returns error if either side is not a vault-relative path or the
    /// entry maps a path onto itself.
    pub fn insert(&mut self, old: &str, new: &str) -> Result<(), RepairMapError> {
        let old = validated(old)?;
        let new = validated(new)?;
        if old == new {
            return Err(RepairMapError::SelfMapping(old));
        }
        self.moves.insert(old, new);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert)
    ///
    /// # Errors
    /// Same as [`insert`](Self::insert).
    pub fn with_move(mut self, old: &str, new: &str) -> Result<Self, RepairMapError> {
        self.insert(old, new)?;
        Ok(self)
    }

    fn from_entries(entries: BTreeMap<String, String>) -> Result<Self, RepairMapError> {
        let mut map = Self::new();
        for (old, new) in &entries {
            map.insert(old, new)?;
        }
        Ok(map)
    }

    /// Parse a TOML document with a `[moves]` table
    ///
    /// # Errors
    /// Returns error on invalid TOML or invalid entries.
    pub fn from_toml_str(s: &str) -> Result<Self, RepairMapError> {
        let file: MovesFile = toml::from_str(s)?;
        Self::from_entries(file.moves)
    }

    /// Parse a flat JSON object of `old: new` pairs
    ///
    /// # Errors
    /// Returns error on invalid JSON or invalid entries.
    pub fn from_json_str(s: &str) -> Result<Self, RepairMapError> {
        let entries: BTreeMap<String, String> = serde_json::from_str(s)?;
        Self::from_entries(entries)
    }

    /// Load from a `.json` or `.toml` file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, RepairMapError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RepairMapError::io_error(path, e))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// New path for `old`
    #[inline]
    #[must_use]
    pub fn get(&self, old: &str) -> Option<&str> {
        self.moves.get(old).map(String::as_str)
    }

    /// Moves in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.moves.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    fn destinations(&self) -> BTreeSet<&str> {
        self.moves.values().map(String::as_str).collect()
    }
}

/// One rewritten reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairChange {
    pub path: VaultPath,
    pub old: String,
    pub new: String,
    pub kind: LinkKind,
    pub line: u32,
}

/// Rewrite every reference whose target exactly equals a map key
///
/// External links and targets already equal to some destination are left
/// alone, so applying the same map twice changes nothing the second time.
#[must_use]
pub fn apply_repairs(document: &Document, map: &RepairMap) -> (String, Vec<RepairChange>) {
    if map.is_empty() {
        return (document.content.clone(), Vec::new());
    }
    let destinations = map.destinations();

    let mut edits = Vec::new();
    for reference in extract_references(document) {
        if reference.is_external() {
            continue;
        }
        let target = reference.target();
        if destinations.contains(target) {
            continue;
        }
        let Some(new) = map.get(target) else {
            continue;
        };

        let range = reference.target_range();
        let start = reference.target_span.start + range.start;
        let end = reference.target_span.start + range.end;
        let angle_wrapped = reference.raw_target.trim_start().starts_with('<');
        let replacement = if reference.kind == LinkKind::MarkdownLink
            && !angle_wrapped
            && new.contains(' ')
        {
            format!("<{new}>")
        } else {
            new.to_string()
        };

        edits.push((
            start..end,
            replacement,
            RepairChange {
                path: document.path.clone(),
                old: target.to_string(),
                new: new.to_string(),
                kind: reference.kind,
                line: reference.line,
            },
        ));
    }

    let mut content = document.content.clone();
    for (range, replacement, _) in edits.iter().rev() {
        content.replace_range(range.clone(), replacement);
    }
    let changes: Vec<RepairChange> = edits.into_iter().map(|(_, _, change)| change).collect();
    if !changes.is_empty() {
        debug!(path = %document.path, changes = changes.len(), "repaired references");
    }
    (content, changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(content: &str) -> Document {
        Document::new(VaultPath::normalize("note.md").unwrap(), content)
    }

    fn moves() -> RepairMap {
        RepairMap::new()
            .with_move("Resources/old.pdf", "Resources/PDFs/new.pdf")
            .unwrap()
            .with_move("Projects/Plan", "Archive/Plan")
            .unwrap()
    }

    #[test]
    fn rewrites_target_and_keeps_syntax() {
        let d = doc("![[Resources/old.pdf]]\n[[Projects/Plan#Goals|the plan]] [pdf](Resources/old.pdf \"Q3\")");
        let (content, changes) = apply_repairs(&d, &moves());
        assert_eq!(
            content,
            "![[Resources/PDFs/new.pdf]]\n[[Archive/Plan#Goals|the plan]] [pdf](Resources/PDFs/new.pdf \"Q3\")"
        );
        let kinds: Vec<_> = changes.iter().map(|c| (c.kind, c.line)).collect();
        assert_eq!(
            kinds,
            vec![(LinkKind::Embed, 1), (LinkKind::Wikilink, 2), (LinkKind::MarkdownLink, 2)]
        );
        assert_eq!(changes[1].old, "Projects/Plan");
        assert_eq!(changes[1].new, "Archive/Plan");
    }

    #[test]
    fn second_application_is_noop() {
        let d = doc("[[Projects/Plan]] and ![[Resources/old.pdf]]");
        let (once, changes) = apply_repairs(&d, &moves());
        assert_eq!(changes.len(), 2);
        let (twice, changes) = apply_repairs(&doc(&once), &moves());
        assert!(changes.is_empty());
        assert_eq!(twice, once);
    }

    #[test]
    fn never_prefix_or_substring() {
        let d = doc("[[Projects/Plan B]] [[Projects/Plan.md]] [[Old/Projects/Plan]]");
        let (content, changes) = apply_repairs(&d, &moves());
        assert!(changes.is_empty());
        assert_eq!(content, d.content);
    }

    #[test]
    fn chains_are_not_followed() {
        let map = RepairMap::new().with_move("a", "b").unwrap().with_move("b", "c").unwrap();
        let (content, changes) = apply_repairs(&doc("[[a]] [[b]]"), &map);
        assert_eq!(content, "[[b]] [[b]]");
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn external_untouched() {
        let map = RepairMap::new().with_move("https:/x", "y").unwrap();
        let (content, changes) = apply_repairs(&doc("[x](https://x)"), &map);
        assert!(changes.is_empty());
        assert_eq!(content, "[x](https://x)");
    }

    #[test]
    fn markdown_target_with_space_gets_wrapped() {
        let map = RepairMap::new().with_move("a.pdf", "My Files/a.pdf").unwrap();
        let (content, _) = apply_repairs(&doc("[a](a.pdf) [b](<a.pdf>) [[a.pdf]]"), &map);
        assert_eq!(content, "[a](<My Files/a.pdf>) [b](<My Files/a.pdf>) [[My Files/a.pdf]]");
    }

    #[test]
    fn table_escaped_alias_survives() {
        let (content, _) = apply_repairs(&doc("| [[Projects/Plan\\|plan]] |"), &moves());
        assert_eq!(content, "| [[Archive/Plan\\|plan]] |");
    }

    #[test]
    fn parses_toml_and_json() {
        let toml = "[moves]\n\"Resources/old.pdf\" = \"Resources/PDFs/new.pdf\"\n\"Projects/Plan\" = \"Archive/Plan\"\n";
        assert_eq!(RepairMap::from_toml_str(toml).unwrap(), moves());
        let json = r#"{"Projects/Plan": "Archive/Plan", "Resources/old.pdf": "Resources/PDFs/new.pdf"}"#;
        let map = RepairMap::from_json_str(json).unwrap();
        assert_eq!(map, moves());
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Projects/Plan", "Resources/old.pdf"]);
    }

    #[test]
    fn rejects_bad_entries() {
        assert!(matches!(
            RepairMap::new().with_move("a.md", "a.md"),
            Err(RepairMapError::SelfMapping(_))
        ));
        assert!(matches!(
            RepairMap::new().with_move("../a.md", "b.md"),
            Err(RepairMapError::InvalidPath { .. })
        ));
        assert!(matches!(
            RepairMap::new().with_move("a.md", "/b.md"),
            Err(RepairMapError::InvalidPath { .. })
        ));
        assert!(matches!(RepairMap::from_toml_str("moves = 3"), Err(RepairMapError::Parse(_))));
    }
}
