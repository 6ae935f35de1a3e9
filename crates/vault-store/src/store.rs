//! Store traits and the pre-computed file set

use crate::error::StoreError;
use std::collections::HashSet;
use vault_model::{Document, DocumentKind, VaultPath};

/// Read/write access to the documents of one vault
///
/// Implementations must be safe to share across worker threads. Writes to the
/// same path are serialized; writes to different paths may run concurrently.
pub trait DocumentStore: Send + Sync {
    /// Paths of documents of `kind`, sorted
    ///
    /// # Errors
    /// Returns error if the vault cannot be enumerated.
    fn list_documents(&self, kind: DocumentKind) -> Result<Vec<VaultPath>, StoreError>;

    /// Read one document
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when absent, [`StoreError::Io`] otherwise.
    fn read(&self, path: &VaultPath) -> Result<Document, StoreError>;

    /// Replace (or create) one document
    ///
    /// # Errors
    /// Returns error if the content could not be persisted.
    fn write(&self, path: &VaultPath, content: &str) -> Result<(), StoreError>;

    /// Whether `path` names an existing file
    fn exists(&self, path: &VaultPath) -> bool;
}

/// File existence check used by link resolution
pub trait FileProbe: Send + Sync {
    /// Whether `path` names an existing file inside the vault
    fn is_file(&self, path: &VaultPath) -> bool;
}

impl<T: FileProbe + ?Sized> FileProbe for &T {
    fn is_file(&self, path: &VaultPath) -> bool {
        (**self).is_file(path)
    }
}

impl<T: FileProbe + ?Sized> FileProbe for std::sync::Arc<T> {
    fn is_file(&self, path: &VaultPath) -> bool {
        (**self).is_file(path)
    }
}

/// Snapshot of every file path in a vault
///
/// Built once per pass so resolution never touches the filesystem again.
#[derive(Debug, Clone, Default)]
pub struct VaultFileSet {
    files: HashSet<VaultPath>,
}

impl VaultFileSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot every file listed by `store`
    ///
    /// # Errors
    /// Returns error if the store cannot be enumerated.
    pub fn from_store(store: &dyn DocumentStore) -> Result<Self, StoreError> {
        let files: HashSet<_> = store.list_documents(DocumentKind::Any)?.into_iter().collect();
        tracing::debug!(files = files.len(), "vault file set built");
        Ok(Self { files })
    }

    /// Add one path
    #[inline]
    pub fn insert(&mut self, path: VaultPath) {
        self.files.insert(path);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<VaultPath> for VaultFileSet {
    fn from_iter<I: IntoIterator<Item = VaultPath>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

impl FileProbe for VaultFileSet {
    fn is_file(&self, path: &VaultPath) -> bool {
        self.files.contains(path)
    }
}

/// [`VaultFileSet`] snapshot with the store as fallback
///
/// Listing skips excluded directories; files that exist there are still
/// found through [`DocumentStore::exists`] when a reference names them.
pub struct CachedProbe<'a> {
    files: VaultFileSet,
    store: &'a dyn DocumentStore,
}

impl<'a> CachedProbe<'a> {
    /// Snapshot `store` once
    ///
    /// # Errors
    /// Returns error if the store cannot be enumerated.
    pub fn new(store: &'a dyn DocumentStore) -> Result<Self, StoreError> {
        let files = VaultFileSet::from_store(store)?;
        Ok(Self { files, store })
    }

    #[inline]
    #[must_use]
    pub fn files(&self) -> &VaultFileSet {
        &self.files
    }
}

impl FileProbe for CachedProbe<'_> {
    fn is_file(&self, path: &VaultPath) -> bool {
        self.files.is_file(path) || self.store.exists(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_set_probe() {
        let set: VaultFileSet = ["a.md", "Resources/doc.pdf"]
            .into_iter()
            .map(|p| VaultPath::normalize(p).unwrap())
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.is_file(&VaultPath::normalize("Resources/doc.pdf").unwrap()));
        assert!(!set.is_file(&VaultPath::normalize("b.md").unwrap()));
        assert!((&set).is_file(&VaultPath::normalize("a.md").unwrap()));
    }
}
