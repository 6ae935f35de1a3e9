//! In-memory document store

use crate::error::StoreError;
use crate::store::{DocumentStore, FileProbe};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use vault_model::{Document, DocumentKind, VaultPath};

/// Document store kept entirely in memory
///
/// Useful for engines that run over generated content and for tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<BTreeMap<VaultPath, String>>,
    people_dir: Option<VaultPath>,
}

impl MemoryDocumentStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With people directory
    #[must_use]
    pub fn with_people_dir(mut self, dir: Option<VaultPath>) -> Self {
        self.people_dir = dir;
        self
    }

    /// Insert a document, replacing any previous content
    pub fn insert(&self, path: VaultPath, content: impl Into<String>) {
        self.docs.write().insert(path, content.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn in_people_dir(&self, path: &VaultPath) -> bool {
        match (&self.people_dir, path.parent()) {
            (None, None) => true,
            (Some(dir), Some(parent)) => *dir == parent,
            _ => false,
        }
    }
}

impl<P: AsRef<str>, C: Into<String>> FromIterator<(P, C)> for MemoryDocumentStore {
    /// Build from `(path, content)` pairs; invalid paths are skipped
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let docs = iter
            .into_iter()
            .filter_map(|(p, c)| VaultPath::normalize(p.as_ref()).ok().map(|p| (p, c.into())))
            .collect();
        Self {
            docs: RwLock::new(docs),
            people_dir: None,
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn list_documents(&self, kind: DocumentKind) -> Result<Vec<VaultPath>, StoreError> {
        let docs = self.docs.read();
        let paths = docs
            .keys()
            .filter(|p| match kind {
                DocumentKind::Any => true,
                DocumentKind::Markdown => p.is_markdown(),
                DocumentKind::Person => {
                    p.is_markdown()
                        && self.in_people_dir(p)
                        && !p.stem().starts_with(|c: char| c.is_ascii_digit())
                }
            })
            .cloned()
            .collect();
        Ok(paths)
    }

    fn read(&self, path: &VaultPath) -> Result<Document, StoreError> {
        self.docs
            .read()
            .get(path)
            .map(|content| Document::new(path.clone(), content.clone()))
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    fn write(&self, path: &VaultPath, content: &str) -> Result<(), StoreError> {
        self.docs.write().insert(path.clone(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &VaultPath) -> bool {
        self.docs.read().contains_key(path)
    }
}

impl FileProbe for MemoryDocumentStore {
    fn is_file(&self, path: &VaultPath) -> bool {
        self.exists(path)
    }
}
