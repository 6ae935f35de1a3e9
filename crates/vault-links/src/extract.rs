//! Reference extraction
//!
//! A single left-to-right byte scan per line finds `![[...]]`, `[[...]]`,
//! `[label](target)` and `![alt](target)`. Links never span lines. Fenced
//! code blocks are skipped.

use vault_model::{Document, LinkKind, LinkReference};

/// Every reference in `document`, in order of occurrence, unresolved
#[must_use]
pub fn extract_references(document: &Document) -> Vec<LinkReference> {
    let mut out = Vec::new();
    let mut offset = 0usize;
    let mut in_fence = false;

    for (idx, line) in document.content.split_inclusive('\n').enumerate() {
        let line_no = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        let base = offset;
        offset += line.len();

        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        scan_line(document, line.trim_end_matches(['\n', '\r']), base, line_no, &mut out);
    }
    out
}

fn find_from(bytes: &[u8], from: usize, pattern: &[u8]) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(pattern.len())
        .position(|w| w == pattern)
        .map(|p| from + p)
}

fn scan_line(document: &Document, line: &str, base: usize, line_no: u32, out: &mut Vec<LinkReference>) {
    let bytes = line.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'[' {
            i += 1;
            continue;
        }
        let bang = i > 0 && bytes[i - 1] == b'!';
        let start = if bang { i - 1 } else { i };

        if bytes.get(i + 1) == Some(&b'[') {
            if let Some(end) = find_from(bytes, i + 2, b"]]") {
                let inner = &line[i + 2..end];
                if !inner.trim().is_empty() {
                    let kind = if bang { LinkKind::Embed } else { LinkKind::Wikilink };
                    out.push(LinkReference::new(
                        document.path.clone(),
                        inner,
                        kind,
                        base + start..base + end + 2,
                        base + i + 2..base + end,
                        line_no,
                    ));
                }
                i = end + 2;
                continue;
            }
            i += 2;
            continue;
        }

        if let Some((label, target, end)) = markdown_link(line, i) {
            if !line[target.clone()].trim().is_empty() {
                out.push(
                    LinkReference::new(
                        document.path.clone(),
                        &line[target.clone()],
                        LinkKind::MarkdownLink,
                        base + start..base + end,
                        base + target.start..base + target.end,
                        line_no,
                    )
                    .with_label(&line[label]),
                );
            }
            i = end;
            continue;
        }
        i += 1;
    }
}

/// `[label](target)` starting at `open`: label range, target range, end offset
fn markdown_link(line: &str, open: usize) -> Option<(std::ops::Range<usize>, std::ops::Range<usize>, usize)> {
    let bytes = line.as_bytes();
    let mut close = open + 1;
    while close < bytes.len() {
        match bytes[close] {
            b']' => break,
            b'[' => return None,
            _ => close += 1,
        }
    }
    if bytes.get(close) != Some(&b']') || bytes.get(close + 1) != Some(&b'(') {
        return None;
    }

    let target_start = close + 2;
    let mut j = target_start;
    while j < bytes.len() && bytes[j] == b' ' {
        j += 1;
    }
    let search_from = if bytes.get(j) == Some(&b'<') {
        find_from(bytes, j + 1, b">")? + 1
    } else {
        target_start
    };
    let target_end = find_from(bytes, search_from, b")")?;
    Some((open + 1..close, target_start..target_end, target_end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vault_model::VaultPath;

    fn doc(content: &str) -> Document {
        Document::new(VaultPath::normalize("note.md").unwrap(), content)
    }

    fn summary(refs: &[LinkReference]) -> Vec<(LinkKind, &str, u32)> {
        refs.iter().map(|r| (r.kind, r.raw_target.as_str(), r.line)).collect()
    }

    #[test]
    fn all_kinds_in_order() {
        let d = doc("See [[Plan]] and ![[chart.png]]\n[doc](Resources/doc.pdf) ![img](a.png)\n");
        let refs = extract_references(&d);
        assert_eq!(
            summary(&refs),
            vec![
                (LinkKind::Wikilink, "Plan", 1),
                (LinkKind::Embed, "chart.png", 1),
                (LinkKind::MarkdownLink, "Resources/doc.pdf", 2),
                (LinkKind::MarkdownLink, "a.png", 2),
            ]
        );
        assert_eq!(refs[2].label.as_deref(), Some("doc"));
    }

    #[test]
    fn spans_point_into_content() {
        let content = "x ![[does-not-exist.pdf]] y\n[a](b.md)";
        let d = doc(content);
        let refs = extract_references(&d);
        assert_eq!(&content[refs[0].span.clone()], "![[does-not-exist.pdf]]");
        assert_eq!(&content[refs[0].target_span.clone()], "does-not-exist.pdf");
        assert_eq!(&content[refs[1].span.clone()], "[a](b.md)");
        assert_eq!(&content[refs[1].target_span.clone()], "b.md");
    }

    #[test]
    fn alias_kept_in_raw_target() {
        let refs = extract_references(&doc("[[Jane Doe|Jane]]"));
        assert_eq!(refs[0].raw_target, "Jane Doe|Jane");
        assert_eq!(refs[0].target(), "Jane Doe");
        assert_eq!(refs[0].display(), Some("Jane"));
    }

    #[test]
    fn empty_targets_skipped() {
        assert!(extract_references(&doc("[[]] [[  ]] [x]() [y]( )")).is_empty());
    }

    #[test]
    fn unclosed_syntax_ignored() {
        assert!(extract_references(&doc("[[open\nclose]] [text] (x) [a](b")).is_empty());
    }

    #[test]
    fn fenced_code_skipped() {
        let refs = extract_references(&doc("```\n[[Hidden]]\n```\n[[Shown]]"));
        assert_eq!(summary(&refs), vec![(LinkKind::Wikilink, "Shown", 4)]);
    }

    #[test]
    fn angle_bracket_target_with_parens() {
        let refs = extract_references(&doc("[f](<Files/a (1).pdf>)"));
        assert_eq!(refs[0].raw_target, "<Files/a (1).pdf>");
        assert_eq!(refs[0].target(), "Files/a (1).pdf");
    }

    #[test]
    fn external_links_extracted() {
        let refs = extract_references(&doc("[site](https://example.com)"));
        assert!(refs[0].is_external());
    }

    proptest::proptest! {
        #[test]
        fn target_span_slices_raw_target(content in "[a-z \\[\\]()!|#<>\n.]{0,80}") {
            let d = doc(&content);
            for reference in extract_references(&d) {
                proptest::prop_assert_eq!(&content[reference.target_span.clone()], reference.raw_target.as_str());
                proptest::prop_assert!(reference.span.start <= reference.target_span.start);
                proptest::prop_assert!(reference.target_span.end <= reference.span.end);
            }
        }
    }

    #[test]
    fn crlf_lines() {
        let content = "[[A]]\r\n[[B]]\r\n";
        let refs = extract_references(&doc(content));
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].line, 2);
        assert_eq!(&content[refs[1].span.clone()], "[[B]]");
    }
}
