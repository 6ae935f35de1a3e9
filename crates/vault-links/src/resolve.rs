//! Reference resolution against the vault
//!
//! Resolution is lexical first (scheme, root escape) and only then touches
//! the filesystem through a [`FileProbe`]. External targets are never probed.

use crate::extract::extract_references;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use vault_model::{
    Diagnostic, DiagnosticKind, Diagnostics, Document, LinkReference, PathError, Resolution,
    VaultPath,
};
use vault_people::PersonIndex;
use vault_store::FileProbe;

/// Resolve one extracted reference
///
/// Steps, first match wins:
/// 1. `http://` / `https://` target: [`Resolution::External`]
/// 2. fragment-only target (`[[#Heading]]`, `(#heading)`): the source document
/// 3. leading `/` or `..` climbing above the root: [`Resolution::BrokenOutsideVault`]
/// 4. `T` (without any `#fragment`) is a file, then `T.md` is a file: [`Resolution::Valid`]
/// 5. otherwise [`Resolution::BrokenMissing`]
#[must_use]
pub fn resolve<P: FileProbe + ?Sized>(reference: LinkReference, probe: &P) -> LinkReference {
    let (resolution, path) = classify(&reference, probe);
    reference.resolved(resolution, path)
}

fn classify<P: FileProbe + ?Sized>(
    reference: &LinkReference,
    probe: &P,
) -> (Resolution, Option<VaultPath>) {
    if reference.is_external() {
        return (Resolution::External, None);
    }

    let target = reference.target();
    let fragment_only = if reference.kind.is_wiki() {
        target.is_empty() && reference.heading().is_some()
    } else {
        target.starts_with('#')
    };
    if fragment_only {
        return (Resolution::Valid, Some(reference.source.clone()));
    }
    // wiki targets already exclude the heading
    let target = target.split_once('#').map_or(target, |(path, _)| path);

    let path = match VaultPath::normalize(target) {
        Ok(path) => path,
        Err(PathError::Absolute(_) | PathError::EscapesRoot(_)) => {
            return (Resolution::BrokenOutsideVault, None)
        }
        Err(PathError::Empty | PathError::NotUtf8(_)) => return (Resolution::BrokenMissing, None),
    };

    if probe.is_file(&path) {
        return (Resolution::Valid, Some(path));
    }
    let with_md = path.with_suffix(".md");
    if probe.is_file(&with_md) {
        return (Resolution::Valid, Some(with_md));
    }
    (Resolution::BrokenMissing, None)
}

/// Mark wikilinks whose target names a known person
pub fn annotate_person(reference: &mut LinkReference, people: &PersonIndex) {
    if !reference.kind.is_wiki() {
        return;
    }
    if let Some(record) = people.find_by_alias(reference.target()) {
        reference.person = Some(record.canonical_name.clone());
    }
}

/// Extract and resolve every reference of one document
#[must_use]
pub fn scan_document<P: FileProbe + ?Sized>(
    document: &Document,
    probe: &P,
    people: Option<&PersonIndex>,
) -> Vec<LinkReference> {
    let refs: Vec<LinkReference> = extract_references(document)
        .into_iter()
        .map(|reference| {
            let mut reference = resolve(reference, probe);
            if let Some(people) = people {
                annotate_person(&mut reference, people);
            }
            reference
        })
        .collect();
    debug!(path = %document.path, references = refs.len(), "scanned document");
    refs
}

/// Diagnostic for a broken reference
#[must_use]
pub fn broken_diagnostic(reference: &LinkReference) -> Diagnostic {
    let reason = match reference.resolution {
        Resolution::BrokenOutsideVault => "points outside the vault",
        _ => "target does not exist",
    };
    Diagnostic::new(
        DiagnosticKind::BrokenReference,
        format!("{} `{}`: {reason}", reference.kind, reference.raw_target),
    )
    .with_path(reference.source.clone())
    .with_subject(reference.raw_target.clone())
    .with_line(reference.line)
}

/// Scan documents in parallel
///
/// References come back grouped by document in input order, each group in
/// order of occurrence. Every broken reference adds a
/// [`DiagnosticKind::BrokenReference`] warning.
#[must_use]
pub fn scan_links<P: FileProbe + ?Sized>(
    documents: &[Document],
    probe: &P,
    people: Option<&PersonIndex>,
) -> (Vec<LinkReference>, Diagnostics) {
    let references: Vec<LinkReference> = documents
        .par_iter()
        .map(|document| scan_document(document, probe, people))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    let mut diagnostics = Diagnostics::new();
    for reference in references.iter().filter(|r| r.is_broken()) {
        warn!(
            path = %reference.source,
            line = reference.line,
            target = %reference.raw_target,
            resolution = %reference.resolution,
            "broken reference"
        );
        diagnostics.push(broken_diagnostic(reference));
    }

    info!(
        documents = documents.len(),
        references = references.len(),
        broken = diagnostics.len(),
        "link scan complete"
    );
    (references, diagnostics)
}

/// Broken references across `documents`, in document order
#[must_use]
pub fn find_broken<P: FileProbe + ?Sized>(documents: &[Document], probe: &P) -> Vec<LinkReference> {
    documents
        .par_iter()
        .map(|document| {
            scan_document(document, probe, None)
                .into_iter()
                .filter(LinkReference::is_broken)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vault_model::LinkKind;
    use vault_people::build_person_index;
    use vault_store::VaultFileSet;

    fn path(raw: &str) -> VaultPath {
        VaultPath::normalize(raw).unwrap()
    }

    fn files(paths: &[&str]) -> VaultFileSet {
        paths.iter().map(|p| path(p)).collect()
    }

    fn doc(content: &str) -> Document {
        Document::new(path("Daily/2025-08-13.md"), content)
    }

    fn resolutions(content: &str, probe: &VaultFileSet) -> Vec<(String, Resolution, Option<String>)> {
        scan_document(&doc(content), probe, None)
            .into_iter()
            .map(|r| {
                let resolved = r.resolved_path.as_ref().map(ToString::to_string);
                (r.raw_target, r.resolution, resolved)
            })
            .collect()
    }

    #[test]
    fn missing_embed_is_broken() {
        let refs = scan_document(&doc("![[does-not-exist.pdf]]"), &files(&[]), None);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, LinkKind::Embed);
        assert_eq!(refs[0].resolution, Resolution::BrokenMissing);
        assert!(refs[0].resolved_path.is_none());
    }

    #[test]
    fn direct_file_then_markdown_suffix() {
        let probe = files(&["Resources/a.pdf", "Projects/Plan.md"]);
        assert_eq!(
            resolutions("![[Resources/a.pdf]] [[Projects/Plan]] [[Projects/Plan.md]]", &probe),
            vec![
                ("Resources/a.pdf".into(), Resolution::Valid, Some("Resources/a.pdf".into())),
                ("Projects/Plan".into(), Resolution::Valid, Some("Projects/Plan.md".into())),
                ("Projects/Plan.md".into(), Resolution::Valid, Some("Projects/Plan.md".into())),
            ]
        );
    }

    #[test]
    fn outside_vault_targets() {
        let probe = files(&["x.md"]);
        let out = resolutions("[a](../x.md) [b](/etc/passwd) [[a/../../x]]", &probe);
        assert!(out.iter().all(|(_, r, p)| *r == Resolution::BrokenOutsideVault && p.is_none()));
    }

    #[test]
    fn normalizes_before_probing() {
        let probe = files(&["Resources/PDFs/a.pdf"]);
        let out = resolutions("[a](./Resources//PDFs/./a.pdf)", &probe);
        assert_eq!(out[0].0, "./Resources//PDFs/./a.pdf");
        assert_eq!(out[0].1, Resolution::Valid);
        assert_eq!(out[0].2.as_deref(), Some("Resources/PDFs/a.pdf"));
    }

    #[test]
    fn external_never_probed() {
        let probe = files(&["https:/example.com"]);
        let out = resolutions("[site](https://example.com) [x](http://a.b/c.pdf)", &probe);
        assert!(out.iter().all(|(_, r, _)| *r == Resolution::External));
    }

    #[test]
    fn heading_fragments() {
        let probe = files(&["Note.md"]);
        let out = resolutions("[[Note#Section]] [[#Top]] [[Missing#Section]]", &probe);
        assert_eq!(out[0].1, Resolution::Valid);
        assert_eq!(out[1].1, Resolution::Valid);
        assert_eq!(out[1].2.as_deref(), Some("Daily/2025-08-13.md"));
        assert_eq!(out[2].1, Resolution::BrokenMissing);
    }

    #[test]
    fn markdown_fragments_resolve_to_file() {
        let probe = files(&["Note.md"]);
        let out = resolutions("[x](Note.md#Section) [y](Note#Section) [z](Gone.md#Section)", &probe);
        assert_eq!(out[0].1, Resolution::Valid);
        assert_eq!(out[0].2.as_deref(), Some("Note.md"));
        assert_eq!(out[1].2.as_deref(), Some("Note.md"));
        assert_eq!(out[2].1, Resolution::BrokenMissing);
        assert_eq!(out[0].0, "Note.md#Section");
    }

    #[test]
    fn dot_only_target_is_missing() {
        let out = resolutions("[[./]]", &files(&[]));
        assert_eq!(out[0].1, Resolution::BrokenMissing);
    }

    #[test]
    fn valid_round_trip_keeps_raw_target() {
        let probe = files(&["People/Jane Doe.md"]);
        let content = "Met [[People/Jane Doe|Jane]] today";
        let first = scan_document(&doc(content), &probe, None);
        assert_eq!(first[0].resolution, Resolution::Valid);
        let again = extract_references(&doc(content));
        assert_eq!(again[0].raw_target, first[0].raw_target);
    }

    #[test]
    fn person_mentions_annotated() {
        let page = Document::new(path("Jane Doe.md"), "---\nname: Jane Doe\naliases: [Jane]\n---\n");
        let (people, _) = build_person_index([&page]);
        let probe = files(&["Jane Doe.md"]);
        let refs = scan_document(&doc("[[Jane Doe]] [[Jane]] [[Other]] [Jane](Jane.md)"), &probe, Some(&people));
        let persons: Vec<_> = refs.iter().map(|r| r.person.as_deref()).collect();
        assert_eq!(persons, vec![Some("Jane Doe"), Some("Jane Doe"), None, None]);
        assert_eq!(refs[1].resolution, Resolution::BrokenMissing);
    }

    #[test]
    fn scan_links_reports_broken() {
        let docs = vec![
            Document::new(path("a.md"), "[[b]] [[gone]]"),
            Document::new(path("b.md"), "![[../secret.png]]\n[ok](a.md)"),
        ];
        let probe = files(&["a.md", "b.md"]);
        let (refs, diagnostics) = scan_links(&docs, &probe, None);
        assert_eq!(refs.len(), 4);
        assert_eq!(refs[0].source, path("a.md"));
        assert_eq!(refs[3].source, path("b.md"));
        assert_eq!(diagnostics.count(DiagnosticKind::BrokenReference), 2);
        assert!(!diagnostics.has_errors());
        let lines: Vec<_> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![Some(1), Some(1)]);

        let broken = find_broken(&docs, &probe);
        let targets: Vec<_> = broken.iter().map(|r| r.raw_target.as_str()).collect();
        assert_eq!(targets, vec!["gone", "../secret.png"]);
    }
}
