//! One batch pass over a vault snapshot
//!
//! [`VaultPass`] owns the store, the configuration and a rayon pool. Each
//! operation loads its documents, runs the engine on the pool and returns a
//! report carrying the engine result next to its diagnostics.

use crate::config::VaultConfig;
use crate::deadline::RunDeadline;
use crate::discovery::is_person_document;
use crate::error::{Result, VaultError};
use chrono::NaiveDate;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vault_gtd::{unlinkable_people, Categorizer, GtdBoard};
use vault_links::{apply_repairs, scan_links, LinkGraph, RepairChange, RepairMap};
use vault_model::{
    ContentHash, Diagnostic, DiagnosticKind, Diagnostics, Document, DocumentKind, LinkReference,
    ProcessedTask, RawTask, VaultPath,
};
use vault_people::{PersonIndex, PersonIndexBuilder};
use vault_store::{CachedProbe, DocumentStore, FsDocumentStore};

/// Documents read for one operation
#[derive(Debug, Default)]
struct Loaded {
    documents: Vec<Document>,
    skipped: Vec<VaultPath>,
    diagnostics: Diagnostics,
}

enum Slot {
    Read(Document),
    Skipped(VaultPath),
    Failed(Diagnostic),
}

enum Repaired {
    Written(RewrittenDocument, Vec<RepairChange>),
    Failed(Diagnostic),
}

/// Person index with its build diagnostics
#[derive(Debug, Clone)]
pub struct PeopleReport {
    pub index: Arc<PersonIndex>,
    pub diagnostics: Diagnostics,
    /// Person pages read
    pub documents: usize,
    pub skipped: Vec<VaultPath>,
}

/// Categorized tasks and their board
#[derive(Debug, Clone, Serialize)]
pub struct GtdReport {
    pub tasks: Vec<ProcessedTask>,
    pub board: GtdBoard,
    /// People left out of task linking
    pub diagnostics: Diagnostics,
}

/// Resolved references across the vault
#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub references: Vec<LinkReference>,
    #[serde(skip)]
    pub graph: LinkGraph,
    pub diagnostics: Diagnostics,
    pub documents: usize,
    pub skipped: Vec<VaultPath>,
}

impl LinkReport {
    /// Broken references only
    pub fn broken(&self) -> impl Iterator<Item = &LinkReference> {
        self.references.iter().filter(|r| r.is_broken())
    }
}

/// Document whose content a repair changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewrittenDocument {
    pub path: VaultPath,
    pub before: ContentHash,
    pub after: ContentHash,
}

/// Outcome of applying a repair map
#[derive(Debug, Clone, Serialize)]
pub struct RepairReport {
    pub changes: Vec<RepairChange>,
    /// Documents whose content changed (written unless `dry_run`)
    pub rewritten: Vec<RewrittenDocument>,
    pub dry_run: bool,
    pub diagnostics: Diagnostics,
    pub skipped: Vec<VaultPath>,
}

/// People and links together
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub people: PeopleReport,
    pub links: LinkReport,
}

impl CheckReport {
    /// All diagnostics, people first
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        self.people
            .diagnostics
            .iter()
            .chain(self.links.diagnostics.iter())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.people.diagnostics.has_errors() || self.links.diagnostics.has_errors()
    }
}

/// Batch pass over one vault
pub struct VaultPass {
    store: Arc<dyn DocumentStore>,
    config: VaultConfig,
    root: PathBuf,
    pool: ThreadPool,
}

impl std::fmt::Debug for VaultPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultPass")
            .field("root", &self.root)
            .field("threads", &self.pool.current_num_threads())
            .finish_non_exhaustive()
    }
}

impl VaultPass {
    /// Pass over `store` with `config`
    ///
    /// # Errors
    /// Returns error if the worker pool cannot be started.
    pub fn new(store: Arc<dyn DocumentStore>, config: VaultConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("vault-worker-{i}"))
            .build()?;
        Ok(Self {
            store,
            root: config.vault_root.clone(),
            config,
            pool,
        })
    }

    /// Pass over the filesystem vault named by `config`
    ///
    /// # Errors
    /// Returns error if the root is not a directory, `people_dir` is
    /// invalid, or the worker pool cannot be started.
    pub fn open(config: VaultConfig) -> Result<Self> {
        let store = FsDocumentStore::open(&config.vault_root)?
            .with_people_dir(config.people_dir_path()?)
            .with_exclude_dirs(config.exclude_dirs.clone());
        Self::new(Arc::new(store), config)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    fn deadline(&self) -> RunDeadline {
        RunDeadline::new(self.config.run_timeout())
    }

    fn load(&self, kind: DocumentKind, deadline: RunDeadline) -> Result<Loaded> {
        let paths = self.store.list_documents(kind)?;
        let store = &self.store;
        let slots: Vec<Slot> = self.pool.install(|| {
            paths
                .into_par_iter()
                .map(|path| {
                    if deadline.expired() {
                        return Slot::Skipped(path);
                    }
                    match store.read(&path) {
                        Ok(document) => Slot::Read(document),
                        Err(err) => Slot::Failed(
                            Diagnostic::new(
                                DiagnosticKind::UnreadableDocument,
                                format!("could not read document: {err}"),
                            )
                            .with_path(path),
                        ),
                    }
                })
                .collect()
        });

        let mut loaded = Loaded::default();
        for slot in slots {
            match slot {
                Slot::Read(document) => loaded.documents.push(document),
                Slot::Skipped(path) => loaded.skipped.push(path),
                Slot::Failed(diagnostic) => {
                    warn!(%diagnostic, "unreadable document");
                    loaded.diagnostics.push(diagnostic);
                }
            }
        }
        Ok(loaded)
    }

    fn note_timeout(skipped: &[VaultPath], diagnostics: &mut Diagnostics) {
        if skipped.is_empty() {
            return;
        }
        warn!(skipped = skipped.len(), "run deadline expired");
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::RunTimedOut,
            format!("run deadline expired; {} documents not processed", skipped.len()),
        ));
    }

    fn people_with(&self, deadline: RunDeadline) -> Result<PeopleReport> {
        let loaded = self.load(DocumentKind::Person, deadline)?;
        let mut builder = PersonIndexBuilder::new().with_validator(self.config.validator());
        let mut documents = 0usize;
        for document in loaded.documents.iter().filter(|d| is_person_document(d)) {
            builder.add_document(document);
            documents += 1;
        }
        debug!(
            candidates = loaded.documents.len(),
            person_pages = documents,
            "selected person pages"
        );

        let (index, built) = builder.build();
        let mut diagnostics = loaded.diagnostics;
        diagnostics.extend(built);
        Self::note_timeout(&loaded.skipped, &mut diagnostics);
        Ok(PeopleReport {
            index: Arc::new(index),
            diagnostics,
            documents,
            skipped: loaded.skipped,
        })
    }

    /// Build the person identity index
    ///
    /// # Errors
    /// Returns error if the people directory cannot be listed.
    pub fn people(&self) -> Result<PeopleReport> {
        self.people_with(self.deadline())
    }

    /// Categorize raw tasks against `index`
    ///
    /// `today` anchors due-date inference when it is enabled.
    #[must_use]
    pub fn gtd(&self, tasks: &[RawTask], index: &PersonIndex, today: NaiveDate) -> GtdReport {
        let categorizer = if self.config.infer_due_dates {
            Categorizer::new().with_due_inference(today)
        } else {
            Categorizer::new()
        };
        let tasks = self.pool.install(|| categorizer.categorize_all(tasks, index));
        let board = GtdBoard::build(&tasks);
        let diagnostics = unlinkable_people(index);
        for diagnostic in &diagnostics {
            warn!(%diagnostic, "person not linkable in task titles");
        }
        info!(tasks = tasks.len(), urgent = board.urgent.len(), "categorized tasks");
        GtdReport { tasks, board, diagnostics }
    }

    fn markdown_documents(&self, deadline: RunDeadline) -> Result<Loaded> {
        let loaded = self.load(DocumentKind::Markdown, deadline)?;
        if loaded.documents.is_empty() && loaded.skipped.is_empty() {
            return Err(VaultError::EmptyVault(self.root.clone()));
        }
        Ok(loaded)
    }

    fn links_with(&self, index: Option<&PersonIndex>, deadline: RunDeadline) -> Result<LinkReport> {
        let loaded = self.markdown_documents(deadline)?;
        let probe = CachedProbe::new(self.store.as_ref())?;
        let (references, scanned) =
            self.pool.install(|| scan_links(&loaded.documents, &probe, index));

        let mut diagnostics = loaded.diagnostics;
        diagnostics.extend(scanned);
        Self::note_timeout(&loaded.skipped, &mut diagnostics);
        let graph = LinkGraph::build(references.iter().cloned());
        Ok(LinkReport {
            references,
            graph,
            diagnostics,
            documents: loaded.documents.len(),
            skipped: loaded.skipped,
        })
    }

    /// Extract and resolve every reference in the vault
    ///
    /// # Errors
    /// Returns [`VaultError::EmptyVault`] when no markdown document exists.
    pub fn links(&self, index: Option<&PersonIndex>) -> Result<LinkReport> {
        self.links_with(index, self.deadline())
    }

    /// Rewrite references moved by `map`
    ///
    /// Changed documents are written back unless `dry_run`. Writes to
    /// different files run concurrently; a failed write becomes a
    /// [`DiagnosticKind::WriteFailed`] diagnostic and the pass continues.
    ///
    /// # Errors
    /// Returns error when no markdown document exists.
    pub fn repair(&self, map: &RepairMap, dry_run: bool) -> Result<RepairReport> {
        let loaded = self.markdown_documents(self.deadline())?;
        let store = &self.store;

        let outcomes: Vec<Repaired> = self.pool.install(|| {
            loaded
                .documents
                .par_iter()
                .filter_map(|document| {
                    let (content, changes) = apply_repairs(document, map);
                    if changes.is_empty() {
                        return None;
                    }
                    if !dry_run {
                        if let Err(err) = store.write(&document.path, &content) {
                            return Some(Repaired::Failed(
                                Diagnostic::new(
                                    DiagnosticKind::WriteFailed,
                                    format!("could not write repaired document: {err}"),
                                )
                                .with_path(document.path.clone()),
                            ));
                        }
                    }
                    let rewritten = RewrittenDocument {
                        path: document.path.clone(),
                        before: document.hash(),
                        after: ContentHash::of(&content),
                    };
                    debug!(
                        path = %rewritten.path,
                        before = %rewritten.before.short(),
                        after = %rewritten.after.short(),
                        dry_run,
                        "repaired document"
                    );
                    Some(Repaired::Written(rewritten, changes))
                })
                .collect()
        });

        let mut report = RepairReport {
            changes: Vec::new(),
            rewritten: Vec::new(),
            dry_run,
            diagnostics: loaded.diagnostics,
            skipped: loaded.skipped,
        };
        for outcome in outcomes {
            match outcome {
                Repaired::Written(rewritten, changes) => {
                    report.rewritten.push(rewritten);
                    report.changes.extend(changes);
                }
                Repaired::Failed(diagnostic) => {
                    warn!(%diagnostic, "repair not written");
                    report.diagnostics.push(diagnostic);
                }
            }
        }
        Self::note_timeout(&report.skipped, &mut report.diagnostics);
        info!(
            documents = report.rewritten.len(),
            changes = report.changes.len(),
            dry_run,
            "repair complete"
        );
        Ok(report)
    }

    /// Person index then link scan, sharing one deadline
    ///
    /// # Errors
    /// Same as [`links`](Self::links).
    pub fn check(&self) -> Result<CheckReport> {
        let deadline = self.deadline();
        let people = self.people_with(deadline)?;
        let links = self.links_with(Some(&people.index), deadline)?;
        info!(
            people = people.index.len(),
            references = links.references.len(),
            errors = people.diagnostics.errors().count() + links.diagnostics.errors().count(),
            "check complete"
        );
        Ok(CheckReport { people, links })
    }
}
