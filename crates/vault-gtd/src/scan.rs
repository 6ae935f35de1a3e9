//! Lexical scanners over task titles
//!
//! Each scanner is a pure function of the title; categorization composes
//! them instead of interleaving their rules.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use vault_model::Priority;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").expect("valid tag regex"));
static CONTEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("valid context regex"));
static MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#@]\w+|!").expect("valid markup regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

fn captures(re: &Regex, title: &str) -> IndexSet<String> {
    re.captures_iter(title)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// `#tags`, first-seen order, case-sensitive dedupe
#[must_use]
pub fn scan_tags(title: &str) -> IndexSet<String> {
    captures(&TAG_RE, title)
}

/// `@contexts`, first-seen order, case-sensitive dedupe
#[must_use]
pub fn scan_contexts(title: &str) -> IndexSet<String> {
    captures(&CONTEXT_RE, title)
}

/// Priority from `!` markers; `!!` anywhere wins
#[must_use]
pub fn scan_priority(title: &str) -> Priority {
    if title.contains("!!") {
        Priority::High
    } else if title.contains('!') {
        Priority::Medium
    } else {
        Priority::Normal
    }
}

/// Title with tags, contexts and priority markers removed, whitespace collapsed
#[must_use]
pub fn strip_markup(title: &str) -> String {
    let stripped = MARKUP_RE.replace_all(title, " ");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Whether `text` contains a tag, a context or a priority marker
#[inline]
#[must_use]
pub fn has_markup(text: &str) -> bool {
    MARKUP_RE.is_match(text)
}

/// Whether `c` counts as a word character for boundary checks
#[inline]
#[must_use]
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tags_in_first_seen_order() {
        let tags = scan_tags("Plan #next trip #travel #next");
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["next", "travel"]);
    }

    #[test]
    fn tags_are_case_sensitive() {
        assert_eq!(scan_tags("#Next #next").len(), 2);
    }

    #[test]
    fn contexts() {
        let contexts = scan_contexts("Buy milk @errands @home @errands");
        assert_eq!(contexts.into_iter().collect::<Vec<_>>(), vec!["errands", "home"]);
    }

    #[test]
    fn lone_markers_are_not_tags() {
        assert!(scan_tags("# heading").is_empty());
        assert!(scan_contexts("meet @ noon").is_empty());
    }

    #[test]
    fn priority_levels() {
        assert_eq!(scan_priority("Pay rent !!"), Priority::High);
        assert_eq!(scan_priority("Pay rent ! !!"), Priority::High);
        assert_eq!(scan_priority("Pay rent !"), Priority::Medium);
        assert_eq!(scan_priority("Pay rent"), Priority::Normal);
    }

    #[test]
    fn strip_markup_collapses_whitespace() {
        assert_eq!(strip_markup("Review contract #next @office !! "), "Review contract");
        assert_eq!(strip_markup("  Call   mom!  #family "), "Call mom");
        assert_eq!(strip_markup("#inbox"), "");
    }

    proptest! {
        #[test]
        fn stripped_title_has_no_markup(title in "[a-zA-Z #@!_\\t]{0,40}") {
            let clean = strip_markup(&title);
            prop_assert!(scan_tags(&clean).is_empty());
            prop_assert!(scan_contexts(&clean).is_empty());
            prop_assert!(!clean.contains('!'));
            prop_assert_eq!(clean.trim(), clean.as_str());
            prop_assert!(!clean.contains("  "));
        }
    }
}
