//! Person page preamble validation
//!
//! Shape checks for the recognized keys (`name`, `aliases`, `emails`, `tags`,
//! `reminders.listName`) plus deprecated tag detection. Validation only
//! reports; it never changes what gets indexed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;
use vault_model::{Diagnostic, DiagnosticKind, Diagnostics, VaultPath};
use vault_store::{value_type_name, Frontmatter};

/// Tags that should no longer appear on person pages
pub const DEFAULT_DEPRECATED_TAGS: &[&str] =
    &["people", "person_p", "people_p", "ideas_p", "idea_p", "org_p"];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

static INLINE_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").expect("valid tag regex"));

/// Whether `email` has `local@domain.tld` shape
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Strings of a YAML sequence; `None` if `value` is not a sequence of strings
pub(crate) fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .map(|v| v.as_str().map(ToString::to_string))
            .collect(),
        _ => None,
    }
}

/// Validator for person page preambles
#[derive(Debug, Clone)]
pub struct PreambleValidator {
    deprecated_tags: Vec<String>,
}

impl PreambleValidator {
    /// Create validator with the default deprecated tag list
    #[must_use]
    pub fn new() -> Self {
        Self {
            deprecated_tags: DEFAULT_DEPRECATED_TAGS.iter().map(ToString::to_string).collect(),
        }
    }

    /// With a custom deprecated tag list
    #[must_use]
    pub fn with_deprecated_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deprecated_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Configured deprecated tags
    #[inline]
    #[must_use]
    pub fn deprecated_tags(&self) -> &[String] {
        &self.deprecated_tags
    }

    fn is_deprecated(&self, tag: &str) -> bool {
        self.deprecated_tags.iter().any(|t| t == tag)
    }

    /// Validate one person page
    ///
    /// `content` is the full document text; inline tags are searched in the
    /// body after the preamble.
    #[must_use]
    pub fn validate(&self, path: &VaultPath, fm: &Frontmatter, content: &str) -> Diagnostics {
        let mut out = Diagnostics::new();
        let field_error = |key: &str, message: String| {
            Diagnostic::new(DiagnosticKind::InvalidFieldType, message)
                .with_path(path.clone())
                .with_subject(key)
        };

        if let Some(name) = fm.get("name") {
            if !name.is_string() && !name.is_null() {
                out.push(field_error(
                    "name",
                    format!("`name` must be a string, got {}", value_type_name(name)),
                ));
            }
        }

        for key in ["aliases", "emails"] {
            if let Some(value) = fm.get(key) {
                if !value.is_null() && string_list(value).is_none() {
                    out.push(field_error(
                        key,
                        format!("`{key}` must be a sequence of strings, got {}", value_type_name(value)),
                    ));
                }
            }
        }

        match fm.get("tags") {
            None | Some(Value::Null) => {}
            Some(Value::Sequence(items)) => {
                for item in items {
                    match item.as_str() {
                        Some(tag) if self.is_deprecated(tag) => out.push(
                            Diagnostic::new(
                                DiagnosticKind::DeprecatedTag,
                                format!("frontmatter tag `{tag}` is deprecated"),
                            )
                            .with_path(path.clone())
                            .with_subject(tag),
                        ),
                        Some(_) => {}
                        None => out.push(field_error(
                            "tags",
                            format!("`tags` entries must be strings, got {}", value_type_name(item)),
                        )),
                    }
                }
            }
            Some(Value::String(tag)) => out.push(field_error(
                "tags",
                format!("`tags` must be a sequence, got scalar `{tag}`"),
            )),
            Some(other) => out.push(field_error(
                "tags",
                format!("`tags` must be a sequence, got {}", value_type_name(other)),
            )),
        }

        match fm.get_path("reminders.listName") {
            None | Some(Value::Null) => {}
            Some(Value::String(list)) => {
                if let Some(name) = fm.get_str("name") {
                    if list != name {
                        out.push(
                            Diagnostic::new(
                                DiagnosticKind::ListNameMismatch,
                                format!("reminders list `{list}` differs from name `{name}`"),
                            )
                            .with_path(path.clone())
                            .with_subject(list.clone()),
                        );
                    }
                }
            }
            Some(other) => out.push(field_error(
                "reminders.listName",
                format!("`reminders.listName` must be a string, got {}", value_type_name(other)),
            )),
        }

        let body = &content[fm.body_offset().min(content.len())..];
        out.extend(self.inline_tags(path, body, fm.end_line() + 1));
        out
    }

    /// Deprecated `#tag` occurrences in a body, outside fenced code
    #[must_use]
    pub fn inline_tags(&self, path: &VaultPath, body: &str, first_line: u32) -> Vec<Diagnostic> {
        let mut found = Vec::new();
        let mut in_fence = false;
        for (line_no, line) in (first_line..).zip(body.lines()) {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence {
                continue;
            }
            for caps in INLINE_TAG_RE.captures_iter(line) {
                let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let glued = line[..whole.start()]
                    .chars()
                    .next_back()
                    .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '/' | '&' | '#'));
                if glued || !self.is_deprecated(tag.as_str()) {
                    continue;
                }
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::DeprecatedTag,
                        format!("inline tag `#{}` is deprecated", tag.as_str()),
                    )
                    .with_path(path.clone())
                    .with_subject(tag.as_str())
                    .with_line(line_no),
                );
            }
        }
        found
    }
}

impl Default for PreambleValidator {
    fn default() -> Self {
        Self::new()
    }
}
