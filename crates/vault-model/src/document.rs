//! Vault documents

use crate::hash::ContentHash;
use crate::path::VaultPath;
use serde::{Deserialize, Serialize};

/// A text document read from the vault
///
/// The document text is the source of truth; everything else in the system
/// is derived from it and can be thrown away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Vault-relative location
    pub path: VaultPath,
    /// Full text, preamble included
    pub content: String,
}

impl Document {
    /// Create a document from path and content
    #[inline]
    #[must_use]
    pub fn new(path: VaultPath, content: impl Into<String>) -> Self {
        Self {
            path,
            content: content.into(),
        }
    }

    /// Content fingerprint
    #[inline]
    #[must_use]
    pub fn hash(&self) -> ContentHash {
        ContentHash::of(&self.content)
    }

    /// File stem, the default display name of the document
    #[inline]
    #[must_use]
    pub fn stem(&self) -> &str {
        self.path.stem()
    }
}

/// Which documents a store listing should return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Every markdown document in the vault
    Markdown,
    /// Markdown documents in the people directory that are not dated notes
    Person,
    /// Every file, markdown or not
    Any,
}
