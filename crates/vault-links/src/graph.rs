//! Link graph summary over a scanned vault

use indexmap::IndexMap;
use serde::Serialize;
use vault_model::{LinkReference, Resolution, VaultPath};

/// Count of references per resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionCounts {
    pub valid: usize,
    pub broken_missing: usize,
    pub broken_outside_vault: usize,
    pub external: usize,
    pub unresolved: usize,
}

impl ResolutionCounts {
    fn record(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Valid => self.valid += 1,
            Resolution::BrokenMissing => self.broken_missing += 1,
            Resolution::BrokenOutsideVault => self.broken_outside_vault += 1,
            Resolution::External => self.external += 1,
            Resolution::Unresolved => self.unresolved += 1,
        }
    }

    /// Broken references of either kind
    #[inline]
    #[must_use]
    pub fn broken(&self) -> usize {
        self.broken_missing + self.broken_outside_vault
    }

    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.valid + self.broken() + self.external + self.unresolved
    }
}

/// Outgoing references per document and incoming counts per target
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkGraph {
    outgoing: IndexMap<VaultPath, Vec<LinkReference>>,
    backlinks: IndexMap<VaultPath, usize>,
    counts: ResolutionCounts,
}

impl LinkGraph {
    /// Build from resolved references
    ///
    /// Self references (fragment-only links) are not counted as backlinks.
    #[must_use]
    pub fn build(references: impl IntoIterator<Item = LinkReference>) -> Self {
        let mut graph = Self::default();
        for reference in references {
            graph.counts.record(reference.resolution);
            if let Some(target) = &reference.resolved_path {
                if *target != reference.source {
                    *graph.backlinks.entry(target.clone()).or_default() += 1;
                }
            }
            graph
                .outgoing
                .entry(reference.source.clone())
                .or_default()
                .push(reference);
        }
        graph
    }

    /// References leaving `source`, in order of occurrence
    #[must_use]
    pub fn outgoing(&self, source: &VaultPath) -> &[LinkReference] {
        self.outgoing.get(source).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of valid references pointing at `target` from other documents
    #[must_use]
    pub fn backlinks(&self, target: &VaultPath) -> usize {
        self.backlinks.get(target).copied().unwrap_or(0)
    }

    /// Targets ordered by descending backlink count, ties in first-seen order
    #[must_use]
    pub fn most_linked(&self) -> Vec<(&VaultPath, usize)> {
        let mut ranked: Vec<_> = self.backlinks.iter().map(|(p, n)| (p, *n)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Documents that contain at least one reference
    pub fn sources(&self) -> impl Iterator<Item = &VaultPath> {
        self.outgoing.keys()
    }

    /// Every broken reference, grouped by source
    pub fn broken(&self) -> impl Iterator<Item = &LinkReference> {
        self.outgoing.values().flatten().filter(|r| r.is_broken())
    }

    #[inline]
    #[must_use]
    pub fn counts(&self) -> ResolutionCounts {
        self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::scan_links;
    use pretty_assertions::assert_eq;
    use vault_model::Document;
    use vault_store::VaultFileSet;

    fn path(raw: &str) -> VaultPath {
        VaultPath::normalize(raw).unwrap()
    }

    fn graph() -> LinkGraph {
        let docs = vec![
            Document::new(path("a.md"), "[[b]] [[c]] [[#Top]]"),
            Document::new(path("b.md"), "[[c]] [[missing]] [w](https://example.com)"),
            Document::new(path("c.md"), "no links"),
        ];
        let probe: VaultFileSet = ["a.md", "b.md", "c.md"].into_iter().map(path).collect();
        let (refs, _) = scan_links(&docs, &probe, None);
        LinkGraph::build(refs)
    }

    #[test]
    fn counts_per_resolution() {
        let counts = graph().counts();
        assert_eq!(
            counts,
            ResolutionCounts {
                valid: 4,
                broken_missing: 1,
                broken_outside_vault: 0,
                external: 1,
                unresolved: 0,
            }
        );
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.broken(), 1);
    }

    #[test]
    fn backlinks_exclude_self() {
        let graph = graph();
        assert_eq!(graph.backlinks(&path("c.md")), 2);
        assert_eq!(graph.backlinks(&path("b.md")), 1);
        assert_eq!(graph.backlinks(&path("a.md")), 0);
        assert_eq!(graph.most_linked()[0], (&path("c.md"), 2));
    }

    #[test]
    fn outgoing_and_broken() {
        let graph = graph();
        assert_eq!(graph.outgoing(&path("a.md")).len(), 3);
        assert!(graph.outgoing(&path("c.md")).is_empty());
        assert_eq!(graph.sources().count(), 2);
        let broken: Vec<_> = graph.broken().map(|r| r.raw_target.as_str()).collect();
        assert_eq!(broken, vec!["missing"]);
    }
}
