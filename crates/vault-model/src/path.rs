//! Vault-relative paths
//!
//! Provides [`VaultPath`], a normalized `/`-separated path that can never
//! point outside the vault root.

use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Path of a file inside the vault, relative to the vault root
///
/// Stored as normalized segments: no empty segments, no `.` segments and no
/// `..` segments. Construction through [`VaultPath::normalize`] rejects
/// absolute paths and paths that climb above the root.
///
/// # Examples
/// - `"People/Jane Doe.md"` → `["People", "Jane Doe.md"]`
/// - `"./Resources//PDFs/./a.pdf"` → `["Resources", "PDFs", "a.pdf"]`
/// - `"a/../b.md"` → `["b.md"]`
/// - `"../outside.pdf"` → [`PathError::EscapesRoot`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VaultPath(Vec<String>);

impl VaultPath {
    /// Normalize a raw, `/`-separated relative path
    ///
    /// # Errors
    /// - [`PathError::Empty`] if nothing remains after normalization
    /// - [`PathError::Absolute`] if the path starts with `/`
    /// - [`PathError::EscapesRoot`] if `..` segments climb above the root
    pub fn normalize(raw: &str) -> Result<Self, PathError> {
        if raw.starts_with('/') {
            return Err(PathError::Absolute(raw.to_string()));
        }

        let mut segments: Vec<String> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(PathError::EscapesRoot(raw.to_string()));
                    }
                }
                other => segments.push(other.to_string()),
            }
        }

        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(segments))
    }

    /// Build from a filesystem path relative to the vault root
    ///
    /// # Errors
    /// Returns error for absolute paths, prefixes, parent components that
    /// escape the root, or non UTF-8 components.
    pub fn from_relative(path: &Path) -> Result<Self, PathError> {
        let mut segments: Vec<String> = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    let part = part
                        .to_str()
                        .ok_or_else(|| PathError::NotUtf8(path.display().to_string()))?;
                    segments.push(part.to_string());
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    if segments.pop().is_none() {
                        return Err(PathError::EscapesRoot(path.display().to_string()));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(PathError::Absolute(path.display().to_string()));
                }
            }
        }
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(segments))
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Final segment (file name)
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    /// File name without its final extension
    #[must_use]
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }

    /// Final extension without the dot, if any
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// Whether the path names a markdown document
    #[inline]
    #[must_use]
    pub fn is_markdown(&self) -> bool {
        matches!(self.extension(), Some(ext) if ext.eq_ignore_ascii_case("md"))
    }

    /// Parent directory, `None` for files at the vault root
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Append a suffix to the file name (`note` + `.md` → `note.md`)
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let mut new = self.clone();
        if let Some(last) = new.0.last_mut() {
            last.push_str(suffix);
        }
        new
    }

    /// Append a child segment
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Whether `dir` names one of this path's ancestor directories
    #[must_use]
    pub fn is_inside(&self, dir: &str) -> bool {
        let dir: Vec<&str> = dir.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
        dir.len() < self.0.len() && self.0.iter().zip(&dir).all(|(a, b)| a == b)
    }

    /// Absolute filesystem path under `root`
    #[must_use]
    pub fn under(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in &self.0 {
            path.push(segment);
        }
        path
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for VaultPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl FromStr for VaultPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl serde::Serialize for VaultPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for VaultPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::normalize(&raw).map_err(serde::de::Error::custom)
    }
}

/// Errors related to vault paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Nothing left after normalization
    #[error("path is empty")]
    Empty,

    /// Path is rooted at `/` (or a drive prefix)
    #[error("absolute path not allowed: '{0}'")]
    Absolute(String),

    /// `..` segments climb above the vault root
    #[error("path escapes the vault root: '{0}'")]
    EscapesRoot(String),

    /// Filesystem component is not valid UTF-8
    #[error("path is not valid UTF-8: '{0}'")]
    NotUtf8(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_plain() {
        let path = VaultPath::normalize("People/Jane Doe.md").unwrap();
        assert_eq!(path.segments(), &["People", "Jane Doe.md"]);
        assert_eq!(path.to_string(), "People/Jane Doe.md");
    }

    #[test]
    fn normalize_dot_and_double_slash() {
        for (input, expected) in [
            ("document.pdf", "document.pdf"),
            ("./document.pdf", "document.pdf"),
            ("Resources//PDFs//document.pdf", "Resources/PDFs/document.pdf"),
            ("Resources/./PDFs/document.pdf", "Resources/PDFs/document.pdf"),
        ] {
            assert_eq!(VaultPath::normalize(input).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn normalize_inner_parent() {
        let path = VaultPath::normalize("a/b/../c.md").unwrap();
        assert_eq!(path.to_string(), "a/c.md");
    }

    #[test]
    fn normalize_rejects_escape() {
        assert!(matches!(
            VaultPath::normalize("../outside-vault.pdf"),
            Err(PathError::EscapesRoot(_))
        ));
        assert!(matches!(
            VaultPath::normalize("a/../../x.pdf"),
            Err(PathError::EscapesRoot(_))
        ));
    }

    #[test]
    fn normalize_rejects_absolute() {
        assert!(matches!(
            VaultPath::normalize("/absolute/path.pdf"),
            Err(PathError::Absolute(_))
        ));
    }

    #[test]
    fn normalize_rejects_empty() {
        assert_eq!(VaultPath::normalize(""), Err(PathError::Empty));
        assert_eq!(VaultPath::normalize("./"), Err(PathError::Empty));
    }

    #[test]
    fn stem_and_extension() {
        let path = VaultPath::normalize("dailynote/2025-08-10.md").unwrap();
        assert_eq!(path.file_name(), "2025-08-10.md");
        assert_eq!(path.stem(), "2025-08-10");
        assert_eq!(path.extension(), Some("md"));
        assert!(path.is_markdown());

        let hidden = VaultPath::normalize(".obsidian").unwrap();
        assert_eq!(hidden.stem(), ".obsidian");
        assert_eq!(hidden.extension(), None);
    }

    #[test]
    fn with_suffix_appends_to_file_name() {
        let path = VaultPath::normalize("People/Jane Doe").unwrap();
        assert_eq!(path.with_suffix(".md").to_string(), "People/Jane Doe.md");
    }

    #[test]
    fn parent_and_is_inside() {
        let path = VaultPath::normalize("Resources/PDFs/a.pdf").unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "Resources/PDFs");
        assert!(path.is_inside("Resources"));
        assert!(path.is_inside("Resources/PDFs/"));
        assert!(!path.is_inside("Res"));
        assert!(VaultPath::normalize("a.pdf").unwrap().parent().is_none());
    }

    #[test]
    fn from_relative_components() {
        let path = VaultPath::from_relative(Path::new("People/./Jane.md")).unwrap();
        assert_eq!(path.to_string(), "People/Jane.md");
        assert!(VaultPath::from_relative(Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn under_root() {
        let path = VaultPath::normalize("a/b.md").unwrap();
        assert_eq!(path.under(Path::new("/vault")), PathBuf::from("/vault/a/b.md"));
    }

    #[test]
    fn serde_as_string() {
        let path = VaultPath::normalize("a/b.md").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"a/b.md\"");
        let back: VaultPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
        assert!(serde_json::from_str::<VaultPath>("\"../x\"").is_err());
    }

    proptest::proptest! {
        #[test]
        fn normalized_segments_are_clean(raw in "[a-z./]{0,24}") {
            if let Ok(path) = VaultPath::normalize(&raw) {
                for segment in path.segments() {
                    proptest::prop_assert!(!segment.is_empty());
                    proptest::prop_assert!(segment != "." && segment != "..");
                }
                let again = VaultPath::normalize(&path.to_string()).unwrap();
                proptest::prop_assert_eq!(again, path);
            }
        }
    }
}
