//! Structured preamble (frontmatter) parsing
//!
//! A preamble is a YAML mapping between a first line `---` (optional BOM) and
//! a closing `---` or `...` line. Values stay as [`serde_yaml::Value`] so
//! shape checks can report the exact type a key was given.

use crate::error::FrontmatterError;
use serde_yaml::{Mapping, Value};

/// Parsed preamble of one document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frontmatter {
    fields: Mapping,
    /// Byte offset where the body starts
    body_offset: usize,
    /// 1-based line of the closing delimiter
    end_line: u32,
}

impl Frontmatter {
    /// Top-level value for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Value at a dotted path (`reminders.listName`)
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            match current {
                Value::Mapping(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// String value for `key`; `None` when absent or not a string
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Whether `key` is present (with any value)
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Whether the `tags` sequence contains `tag`
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        match self.get("tags") {
            Some(Value::Sequence(items)) => items.iter().any(|v| v.as_str() == Some(tag)),
            _ => false,
        }
    }

    /// Underlying mapping
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &Mapping {
        &self.fields
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Byte offset of the first body byte in the document
    #[inline]
    #[must_use]
    pub fn body_offset(&self) -> usize {
        self.body_offset
    }

    /// 1-based line of the closing delimiter
    #[inline]
    #[must_use]
    pub fn end_line(&self) -> u32 {
        self.end_line
    }
}

/// Short name of a YAML value's type, for diagnostics
#[must_use]
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Parse the preamble of `content`
///
/// Returns `Ok(None)` when the document has no preamble. An empty block
/// (`---` immediately followed by `---`) yields an empty [`Frontmatter`].
///
/// # Errors
/// - [`FrontmatterError::Malformed`] on YAML syntax errors or a missing
///   closing delimiter
/// - [`FrontmatterError::NotAMapping`] when the block is not a mapping
pub fn parse_frontmatter(content: &str) -> Result<Option<Frontmatter>, FrontmatterError> {
    let mut lines = content.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if first.trim_start_matches('\u{feff}').trim_end() != "---" {
        return Ok(None);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    let mut line_no: u32 = 1;
    let mut closing = None;

    for line in lines {
        line_no += 1;
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            closing = Some((offset, offset + line.len(), line_no));
            break;
        }
        offset += line.len();
    }

    let Some((yaml_end, body_offset, end_line)) = closing else {
        return Err(FrontmatterError::malformed("frontmatter block is never closed", Some(1)));
    };

    let raw_yaml = &content[yaml_start..yaml_end];
    if raw_yaml.trim().is_empty() {
        return Ok(Some(Frontmatter {
            fields: Mapping::new(),
            body_offset,
            end_line,
        }));
    }

    let value: Value = serde_yaml::from_str(raw_yaml).map_err(|e| {
        let line = e.location().and_then(|loc| u32::try_from(loc.line()).ok()).map(|l| l + 1);
        FrontmatterError::malformed(e.to_string(), line)
    })?;

    match value {
        Value::Mapping(fields) => Ok(Some(Frontmatter {
            fields,
            body_offset,
            end_line,
        })),
        Value::Null => Ok(Some(Frontmatter {
            fields: Mapping::new(),
            body_offset,
            end_line,
        })),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Body of `content`: everything after the preamble, or the whole text
#[must_use]
pub fn body(content: &str) -> (&str, u32) {
    match parse_frontmatter(content) {
        Ok(Some(fm)) => (&content[fm.body_offset..], fm.end_line + 1),
        _ => (content, 1),
    }
}
