//! Cross-document references
//!
//! A [`LinkReference`] is one occurrence of link syntax in a document. It is
//! recomputed on every pass and never persisted back into the vault.

use crate::path::VaultPath;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Syntax a reference was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// `[[target]]` or `[[target|display]]`
    Wikilink,
    /// `![[target]]`
    Embed,
    /// `[display](target)` or `![alt](target)`
    MarkdownLink,
}

impl LinkKind {
    /// Whether the reference uses double-bracket syntax
    #[inline]
    #[must_use]
    pub fn is_wiki(&self) -> bool {
        matches!(self, LinkKind::Wikilink | LinkKind::Embed)
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkKind::Wikilink => "wikilink",
            LinkKind::Embed => "embed",
            LinkKind::MarkdownLink => "markdown_link",
        })
    }
}

/// Outcome of resolving a reference against the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Extracted but not resolved yet
    #[default]
    Unresolved,
    /// Target file exists inside the vault
    Valid,
    /// Target file does not exist
    BrokenMissing,
    /// Target lies outside the vault root
    BrokenOutsideVault,
    /// `http://` or `https://` target; never probed
    External,
}

impl Resolution {
    /// Whether the reference is broken
    #[inline]
    #[must_use]
    pub fn is_broken(&self) -> bool {
        matches!(self, Resolution::BrokenMissing | Resolution::BrokenOutsideVault)
    }

    /// Snake-case name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Unresolved => "unresolved",
            Resolution::Valid => "valid",
            Resolution::BrokenMissing => "broken_missing",
            Resolution::BrokenOutsideVault => "broken_outside_vault",
            Resolution::External => "external",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of what a target points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    External,
    Image,
    Pdf,
    Markdown,
    Other,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Shrink `range` of `s` to exclude surrounding whitespace
fn trim_range(s: &str, range: Range<usize>) -> Range<usize> {
    let slice = &s[range.clone()];
    let start = range.start + (slice.len() - slice.trim_start().len());
    let end = range.end - (slice.len() - slice.trim_end().len());
    if start >= end {
        start..start
    } else {
        start..end
    }
}

/// One reference found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    /// Document the reference appears in
    pub source: VaultPath,
    /// Text inside the link syntax, unmodified
    pub raw_target: String,
    pub kind: LinkKind,
    #[serde(default)]
    pub resolution: Resolution,
    /// Present iff `resolution` is [`Resolution::Valid`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<VaultPath>,
    /// Byte range of the whole link syntax in the source content
    pub span: Range<usize>,
    /// Byte range of `raw_target` in the source content
    pub target_span: Range<usize>,
    /// 1-based line of occurrence
    pub line: u32,
    /// Bracket text of a markdown link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Canonical name of the person the target names, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
}

impl LinkReference {
    /// Create an unresolved reference
    #[must_use]
    pub fn new(
        source: VaultPath,
        raw_target: impl Into<String>,
        kind: LinkKind,
        span: Range<usize>,
        target_span: Range<usize>,
        line: u32,
    ) -> Self {
        Self {
            source,
            raw_target: raw_target.into(),
            kind,
            resolution: Resolution::Unresolved,
            resolved_path: None,
            span,
            target_span,
            line,
            label: None,
            person: None,
        }
    }

    /// With markdown bracket text
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Byte range of the wiki path part: before `|` (table escape removed)
    fn wiki_path_range(&self) -> Range<usize> {
        let raw = self.raw_target.as_str();
        match raw.find('|') {
            Some(pipe) if raw[..pipe].ends_with('\\') => 0..pipe - 1,
            Some(pipe) => 0..pipe,
            None => 0..raw.len(),
        }
    }

    /// Byte range of [`target`](Self::target) within `raw_target`
    #[must_use]
    pub fn target_range(&self) -> Range<usize> {
        let raw = self.raw_target.as_str();
        if self.kind.is_wiki() {
            let path = self.wiki_path_range();
            let end = raw[path.clone()].find('#').map_or(path.end, |idx| path.start + idx);
            return trim_range(raw, path.start..end);
        }

        let range = trim_range(raw, 0..raw.len());
        let trimmed = &raw[range.clone()];
        if let Some(inner) = trimmed.strip_prefix('<') {
            if let Some(gt) = inner.find('>') {
                return trim_range(raw, range.start + 1..range.start + 1 + gt);
            }
        }
        if trimmed.ends_with('"') {
            if let Some(idx) = trimmed.find(" \"") {
                return trim_range(raw, range.start..range.start + idx);
            }
        }
        range
    }

    /// Resolvable target
    ///
    /// Wiki syntax: the part before `|` and before `#`. Markdown: the URL with
    /// `<...>` unwrapped and any `"title"` dropped. Always trimmed.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.raw_target[self.target_range()]
    }

    /// Display alias after `|` (wiki) or bracket text (markdown)
    #[must_use]
    pub fn display(&self) -> Option<&str> {
        if self.kind.is_wiki() {
            self.raw_target.find('|').map(|idx| &self.raw_target[idx + 1..])
        } else {
            self.label.as_deref()
        }
    }

    /// `#heading` fragment of a wiki target
    #[must_use]
    pub fn heading(&self) -> Option<&str> {
        if !self.kind.is_wiki() {
            return None;
        }
        let path = &self.raw_target[self.wiki_path_range()];
        path.find('#').map(|idx| path[idx + 1..].trim())
    }

    /// Whether the target is an `http(s)` URL
    #[inline]
    #[must_use]
    pub fn is_external(&self) -> bool {
        let target = self.target();
        target.starts_with("http://") || target.starts_with("https://")
    }

    /// Classify the target by scheme and extension
    #[must_use]
    pub fn target_type(&self) -> TargetType {
        if self.is_external() {
            return TargetType::External;
        }
        let target = self.target();
        let name = target.rsplit('/').next().unwrap_or(target);
        let Some(idx) = name.rfind('.') else {
            return TargetType::Markdown;
        };
        let ext = name[idx + 1..].to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            TargetType::Image
        } else if ext == "pdf" {
            TargetType::Pdf
        } else if ext == "md" {
            TargetType::Markdown
        } else {
            TargetType::Other
        }
    }

    /// Record the resolution outcome
    #[must_use]
    pub fn resolved(mut self, resolution: Resolution, path: Option<VaultPath>) -> Self {
        self.resolved_path = if resolution == Resolution::Valid { path } else { None };
        self.resolution = resolution;
        self
    }

    /// Whether the reference is broken
    #[inline]
    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.resolution.is_broken()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiki(raw: &str) -> LinkReference {
        let source = VaultPath::normalize("note.md").unwrap();
        LinkReference::new(source, raw, LinkKind::Wikilink, 0..raw.len() + 4, 2..raw.len() + 2, 1)
    }

    fn markdown(raw: &str) -> LinkReference {
        let source = VaultPath::normalize("note.md").unwrap();
        LinkReference::new(source, raw, LinkKind::MarkdownLink, 0..0, 0..0, 1)
    }

    #[test]
    fn wiki_target_strips_alias_and_heading() {
        let link = wiki("Projects/Plan#Goals|the plan");
        assert_eq!(link.target(), "Projects/Plan");
        assert_eq!(link.heading(), Some("Goals"));
        assert_eq!(link.display(), Some("the plan"));
    }

    #[test]
    fn wiki_target_table_escaped_pipe() {
        let link = wiki("Jane Doe\\|Jane");
        assert_eq!(link.target(), "Jane Doe");
        assert_eq!(link.target_range(), 0..8);
        assert_eq!(link.display(), Some("Jane"));
    }

    #[test]
    fn heading_only_link_has_empty_target() {
        let link = wiki("#Summary");
        assert_eq!(link.target(), "");
        assert_eq!(link.heading(), Some("Summary"));
    }

    #[test]
    fn markdown_target_unwraps_angle_brackets_and_title() {
        assert_eq!(markdown("<My File.pdf>").target(), "My File.pdf");
        assert_eq!(markdown(" <a.pdf> ").target_range(), 2..7);
        assert_eq!(markdown("doc.pdf \"Quarterly\"").target(), "doc.pdf");
        assert_eq!(markdown(" doc.pdf ").target(), "doc.pdf");
    }

    #[test]
    fn markdown_keeps_hash_in_target() {
        assert_eq!(markdown("notes#1.md").target(), "notes#1.md");
        assert_eq!(markdown("notes#1.md").heading(), None);
    }

    #[test]
    fn classifies_target_types() {
        assert_eq!(markdown("https://example.com").target_type(), TargetType::External);
        assert_eq!(markdown("http://example.com/a.png").target_type(), TargetType::External);
        assert_eq!(markdown("images/photo.PNG").target_type(), TargetType::Image);
        assert_eq!(markdown("image.jpeg").target_type(), TargetType::Image);
        assert_eq!(markdown("document.pdf").target_type(), TargetType::Pdf);
        assert_eq!(markdown("note.md").target_type(), TargetType::Markdown);
        assert_eq!(wiki("Some Note").target_type(), TargetType::Markdown);
        assert_eq!(markdown("data.csv").target_type(), TargetType::Other);
    }

    #[test]
    fn resolved_path_only_when_valid() {
        let path = VaultPath::normalize("a.md").unwrap();
        let link = wiki("a").resolved(Resolution::BrokenMissing, Some(path.clone()));
        assert!(link.resolved_path.is_none());
        assert!(link.is_broken());

        let link = wiki("a").resolved(Resolution::Valid, Some(path.clone()));
        assert_eq!(link.resolved_path, Some(path));
        assert!(!link.is_broken());
    }
}
