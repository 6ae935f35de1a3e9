//! Filesystem-backed document store

use crate::error::StoreError;
use crate::store::{DocumentStore, FileProbe};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vault_model::{Document, DocumentKind, VaultPath};
use walkdir::{DirEntry, WalkDir};

/// Directories skipped when walking a vault
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[".obsidian", ".git", ".trash", "node_modules"];

/// Document store over a directory tree
///
/// Writes are atomic (temp file + rename in the target directory) and
/// serialized per target path.
#[derive(Debug)]
pub struct FsDocumentStore {
    root: PathBuf,
    people_dir: Option<VaultPath>,
    exclude_dirs: Vec<String>,
    write_locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl FsDocumentStore {
    /// Open a vault rooted at `root`
    ///
    /// # Errors
    /// [`StoreError::InvalidRoot`] if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::InvalidRoot(root));
        }
        Ok(Self {
            root,
            people_dir: None,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(ToString::to_string).collect(),
            write_locks: DashMap::new(),
        })
    }

    /// With people directory (relative to the root; `None` = root)
    #[must_use]
    pub fn with_people_dir(mut self, dir: Option<VaultPath>) -> Self {
        self.people_dir = dir;
        self
    }

    /// With directory names or relative paths to skip
    #[must_use]
    pub fn with_exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.exclude_dirs = dirs;
        self
    }

    /// Vault root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        let relative = entry
            .path()
            .strip_prefix(&self.root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();
        self.exclude_dirs
            .iter()
            .any(|dir| dir.as_str() == name || dir.trim_matches('/') == relative)
    }

    fn walk(&self, max_depth: Option<usize>, start: &Path) -> Vec<VaultPath> {
        let mut walker = WalkDir::new(start).follow_links(true);
        if let Some(depth) = max_depth {
            walker = walker.max_depth(depth);
        }

        let mut paths: Vec<VaultPath> = walker
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e))
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let relative = e.path().strip_prefix(&self.root).ok()?;
                VaultPath::from_relative(relative).ok()
            })
            .collect();
        paths.sort();
        paths
    }

    fn is_person_candidate(path: &VaultPath) -> bool {
        path.is_markdown() && !path.stem().starts_with(|c: char| c.is_ascii_digit())
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        self.write_locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl DocumentStore for FsDocumentStore {
    fn list_documents(&self, kind: DocumentKind) -> Result<Vec<VaultPath>, StoreError> {
        let paths = match kind {
            DocumentKind::Any => self.walk(None, &self.root),
            DocumentKind::Markdown => {
                let mut paths = self.walk(None, &self.root);
                paths.retain(VaultPath::is_markdown);
                paths
            }
            DocumentKind::Person => {
                let dir = match &self.people_dir {
                    Some(dir) => dir.under(&self.root),
                    None => self.root.clone(),
                };
                if !dir.is_dir() {
                    tracing::debug!(dir = %dir.display(), "people directory missing");
                    return Ok(Vec::new());
                }
                let mut paths = self.walk(Some(1), &dir);
                paths.retain(Self::is_person_candidate);
                paths
            }
        };
        tracing::debug!(?kind, count = paths.len(), "listed documents");
        Ok(paths)
    }

    fn read(&self, path: &VaultPath) -> Result<Document, StoreError> {
        let full = path.under(&self.root);
        match fs::read_to_string(&full) {
            Ok(content) => Ok(Document::new(path.clone(), content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.clone()))
            }
            Err(e) => Err(StoreError::io_error(full, e)),
        }
    }

    fn write(&self, path: &VaultPath, content: &str) -> Result<(), StoreError> {
        let full = path.under(&self.root);
        let lock = self.lock_for(&full);
        let _guard = lock.lock();

        let dir = full.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir).map_err(|e| StoreError::io_error(dir, e))?;

        let tmp = dir.join(format!(".{}.vault-tmp", path.file_name()));
        let mut file = fs::File::create(&tmp).map_err(|e| StoreError::io_error(&tmp, e))?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| StoreError::io_error(&tmp, e))?;
        drop(file);
        fs::rename(&tmp, &full).map_err(|e| StoreError::io_error(&full, e))?;

        tracing::debug!(path = %path, bytes = content.len(), "document written");
        Ok(())
    }

    fn exists(&self, path: &VaultPath) -> bool {
        path.under(&self.root).is_file()
    }
}

impl FileProbe for FsDocumentStore {
    fn is_file(&self, path: &VaultPath) -> bool {
        self.exists(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CachedProbe;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn vault() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("People")).unwrap();
        fs::create_dir_all(root.join(".obsidian")).unwrap();
        fs::create_dir_all(root.join("Resources")).unwrap();
        fs::write(root.join("Jane Doe.md"), "---\nname: Jane Doe\n---\n").unwrap();
        fs::write(root.join("2025-08-10.md"), "daily").unwrap();
        fs::write(root.join("People/John.md"), "---\nname: John\n---\n").unwrap();
        fs::write(root.join(".obsidian/app.md"), "cfg").unwrap();
        fs::write(root.join("Resources/doc.pdf"), "pdf").unwrap();
        dir
    }

    fn names(paths: &[VaultPath]) -> Vec<String> {
        paths.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn lists_markdown_skipping_excluded() {
        let dir = vault();
        let store = FsDocumentStore::open(dir.path()).unwrap();
        let paths = store.list_documents(DocumentKind::Markdown).unwrap();
        assert_eq!(names(&paths), vec!["2025-08-10.md", "Jane Doe.md", "People/John.md"]);
    }

    #[test]
    fn cached_probe_finds_excluded_files() {
        let dir = vault();
        let store = FsDocumentStore::open(dir.path()).unwrap();
        let probe = CachedProbe::new(&store).unwrap();
        let hidden = VaultPath::normalize(".obsidian/app.md").unwrap();
        assert!(!probe.files().is_file(&hidden));
        assert!(probe.is_file(&hidden));
        assert!(probe.is_file(&VaultPath::normalize("Resources/doc.pdf").unwrap()));
        assert!(!probe.is_file(&VaultPath::normalize(".obsidian/gone.md").unwrap()));
    }

    #[test]
    fn lists_any_file() {
        let dir = vault();
        let store = FsDocumentStore::open(dir.path()).unwrap();
        let paths = store.list_documents(DocumentKind::Any).unwrap();
        assert!(names(&paths).contains(&"Resources/doc.pdf".to_string()));
    }

    #[test]
    fn person_listing_is_flat_and_skips_dated_notes() {
        let dir = vault();
        let store = FsDocumentStore::open(dir.path()).unwrap();
        let paths = store.list_documents(DocumentKind::Person).unwrap();
        assert_eq!(names(&paths), vec!["Jane Doe.md"]);

        let store = store.with_people_dir(Some(VaultPath::normalize("People").unwrap()));
        let paths = store.list_documents(DocumentKind::Person).unwrap();
        assert_eq!(names(&paths), vec!["People/John.md"]);
    }

    #[test]
    fn read_and_write_round_trip() {
        let dir = vault();
        let store = FsDocumentStore::open(dir.path()).unwrap();
        let path = VaultPath::normalize("Notes/new.md").unwrap();
        store.write(&path, "hello [[Jane Doe]]").unwrap();
        assert!(store.exists(&path));
        assert_eq!(store.read(&path).unwrap().content, "hello [[Jane Doe]]");
        assert!(!dir.path().join("Notes/.new.md.vault-tmp").exists());
    }

    #[test]
    fn read_missing_is_not_found() {
        let dir = vault();
        let store = FsDocumentStore::open(dir.path()).unwrap();
        let err = store.read(&VaultPath::normalize("nope.md").unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn open_rejects_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = FsDocumentStore::open(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRoot(_)));
    }

    #[test]
    fn concurrent_writes_same_path() {
        let dir = vault();
        let store = Arc::new(FsDocumentStore::open(dir.path()).unwrap());
        let path = VaultPath::normalize("shared.md").unwrap();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let path = path.clone();
                std::thread::spawn(move || store.write(&path, &format!("writer {i}")).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let content = store.read(&path).unwrap().content;
        assert!(content.starts_with("writer "));
    }
}
