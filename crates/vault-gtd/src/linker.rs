//! Person linking in task titles
//!
//! Aliases are tried longest first. Each accepted match is replaced by
//! `[[Canonical Name]]`; text already inside `[[...]]` is never touched and
//! a match must not be glued to adjacent word characters. People whose
//! canonical name carries task markup (`#tag`, `@context`, `!`) are never
//! linked, so a clean title stays free of markup.

use crate::scan::{has_markup, is_word_char};
use std::sync::Arc;
use vault_model::{Diagnostic, DiagnosticKind, Diagnostics, PersonRecord};
use vault_people::PersonIndex;

#[derive(Debug)]
enum Piece {
    /// Plain text still open to matching
    Text(String),
    /// `[[...]]` present in the input
    Existing(String),
    /// Linked person
    Person(Arc<PersonRecord>),
}

impl Piece {
    fn first_char(&self) -> Option<char> {
        match self {
            Piece::Text(s) | Piece::Existing(s) => s.chars().next(),
            Piece::Person(_) => Some('['),
        }
    }

    fn last_char(&self) -> Option<char> {
        match self {
            Piece::Text(s) | Piece::Existing(s) => s.chars().next_back(),
            Piece::Person(_) => Some(']'),
        }
    }
}

/// Split `title` into free text and existing `[[...]]` spans
fn split_existing(title: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut rest = title;
    while let Some(open) = rest.find("[[") {
        let Some(close) = rest[open + 2..].find("]]") else {
            break;
        };
        let end = open + 2 + close + 2;
        if open > 0 {
            pieces.push(Piece::Text(rest[..open].to_string()));
        }
        pieces.push(Piece::Existing(rest[open..end].to_string()));
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest.to_string()));
    }
    pieces
}

/// Byte offsets of boundary-respecting occurrences of `alias` in `text`
fn find_matches(text: &str, alias: &str, before: Option<char>, after: Option<char>) -> Vec<usize> {
    let needs_left = alias.chars().next().is_some_and(is_word_char);
    let needs_right = alias.chars().next_back().is_some_and(is_word_char);

    let mut found = Vec::new();
    let mut from = 0;
    while let Some(rel) = text[from..].find(alias) {
        let start = from + rel;
        let end = start + alias.len();
        let prev = text[..start].chars().next_back().or(before);
        let next = text[end..].chars().next().or(after);
        let left_ok = !needs_left || !prev.is_some_and(is_word_char);
        let right_ok = !needs_right || !next.is_some_and(is_word_char);
        if left_ok && right_ok {
            found.push(start);
            from = end;
        } else {
            // step one char so overlapping candidates are still seen
            from = start + text[start..].chars().next().map_or(1, char::len_utf8);
        }
    }
    found
}

/// Replace known person names in `title` with wikilinks
///
/// Returns the rewritten title and the linked people, left to right, one
/// entry per replaced occurrence.
#[must_use]
pub fn link_people(title: &str, index: &PersonIndex) -> (String, Vec<Arc<PersonRecord>>) {
    if index.is_empty() {
        return (title.to_string(), Vec::new());
    }
    let mut pieces = split_existing(title);

    for (alias, record) in index.aliases_longest_first() {
        if alias.is_empty()
            || has_markup(&record.canonical_name)
            || !pieces_contain(&pieces, alias)
        {
            continue;
        }
        let bounds: Vec<(Option<char>, Option<char>)> = (0..pieces.len())
            .map(|i| {
                let before = i.checked_sub(1).and_then(|j| pieces[j].last_char());
                let after = pieces.get(i + 1).and_then(Piece::first_char);
                (before, after)
            })
            .collect();

        let mut rebuilt = Vec::with_capacity(pieces.len());
        for (piece, (before, after)) in pieces.into_iter().zip(bounds) {
            match piece {
                Piece::Text(text) => {
                    let starts = find_matches(&text, alias, before, after);
                    if starts.is_empty() {
                        rebuilt.push(Piece::Text(text));
                    } else {
                        rebuilt.extend(split_text(&text, alias, &starts, record));
                    }
                }
                other => rebuilt.push(other),
            }
        }
        pieces = rebuilt;
    }

    let mut out = String::with_capacity(title.len());
    let mut linked = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Text(s) | Piece::Existing(s) => out.push_str(&s),
            Piece::Person(record) => {
                out.push_str(&record.wikilink());
                linked.push(record);
            }
        }
    }
    (out, linked)
}

/// People that [`link_people`] skips because their name carries markup
#[must_use]
pub fn unlinkable_people(index: &PersonIndex) -> Diagnostics {
    index
        .records()
        .iter()
        .filter(|record| has_markup(&record.canonical_name))
        .map(|record| {
            Diagnostic::new(
                DiagnosticKind::UnlinkablePerson,
                "person name contains task markup; not linked in task titles",
            )
            .with_path(record.page_path.clone())
            .with_subject(record.canonical_name.clone())
        })
        .collect()
}

fn pieces_contain(pieces: &[Piece], alias: &str) -> bool {
    pieces
        .iter()
        .any(|p| matches!(p, Piece::Text(s) if s.contains(alias)))
}

fn split_text(text: &str, alias: &str, starts: &[usize], record: &Arc<PersonRecord>) -> Vec<Piece> {
    let mut out = Vec::with_capacity(starts.len() * 2 + 1);
    let mut cursor = 0;
    for &start in starts {
        if start > cursor {
            out.push(Piece::Text(text[cursor..start].to_string()));
        }
        out.push(Piece::Person(Arc::clone(record)));
        cursor = start + alias.len();
    }
    if cursor < text.len() {
        out.push(Piece::Text(text[cursor..].to_string()));
    }
    out
}
