//! Reminders cache ingestion
//!
//! The reminders bridge leaves a JSON cache shaped as
//! `{"byList": {"<list>": [{id, title, notes, flagged, due, completed}]}}`.
//! Lists and items keep their cache order.

use crate::error::GtdError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use vault_model::RawTask;

/// Parsed reminders cache
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemindersCache {
    #[serde(rename = "byList", default)]
    by_list: IndexMap<String, Vec<CacheItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CacheItem {
    #[serde(default, deserialize_with = "id_string")]
    id: String,
    #[serde(default, alias = "name")]
    title: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    flagged: Option<bool>,
    #[serde(default, alias = "dueDate")]
    due: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Parse a bridge timestamp: RFC 3339, or a bare date taken as midnight UTC
#[must_use]
pub fn parse_due(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

impl RemindersCache {
    /// Parse cache JSON
    ///
    /// # Errors
    /// [`GtdError::Json`] when the text is not a valid cache document.
    pub fn from_json_str(json: &str) -> Result<Self, GtdError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a cache file
    ///
    /// # Errors
    /// [`GtdError::Io`] when the file cannot be read, [`GtdError::Json`] when
    /// it does not parse.
    pub fn load(path: &Path) -> Result<Self, GtdError> {
        let text = std::fs::read_to_string(path).map_err(|e| GtdError::io_error(path, e))?;
        Self::from_json_str(&text)
    }

    /// List names in cache order
    pub fn lists(&self) -> impl Iterator<Item = &str> {
        self.by_list.keys().map(String::as_str)
    }

    /// Number of items across all lists
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_list.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into raw tasks, list name injected
    ///
    /// Unparseable due timestamps are dropped with a warning.
    #[must_use]
    pub fn into_raw_tasks(self) -> Vec<RawTask> {
        let mut tasks = Vec::with_capacity(self.len());
        for (list, items) in self.by_list {
            for item in items {
                let due = item.due.as_deref().and_then(|raw| {
                    let parsed = parse_due(raw);
                    if parsed.is_none() && !raw.trim().is_empty() {
                        tracing::warn!(id = %item.id, due = raw, "ignoring unparseable due date");
                    }
                    parsed
                });
                tasks.push(RawTask {
                    id: item.id,
                    title: item.title.unwrap_or_default(),
                    list: list.clone(),
                    notes: item.notes.unwrap_or_default(),
                    due,
                    completed: item.completed.unwrap_or(false),
                    flagged: item.flagged.unwrap_or(false),
                });
            }
        }
        tracing::debug!(tasks = tasks.len(), "reminders cache flattened");
        tasks
    }
}
