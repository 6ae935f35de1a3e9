//! RawTask → ProcessedTask

use crate::due::infer_due;
use crate::linker::link_people;
use crate::scan::{scan_contexts, scan_priority, scan_tags, strip_markup};
use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use std::cmp::Ordering;
use vault_model::{ProcessedTask, RawTask, TaskStatus};
use vault_people::PersonIndex;

/// Status by fixed precedence: completed, inbox, next, waiting, someday
#[must_use]
pub fn status_for(completed: bool, tags: &IndexSet<String>) -> TaskStatus {
    if completed {
        return TaskStatus::Completed;
    }
    TaskStatus::ALL
        .into_iter()
        .find(|status| status.tag().is_some_and(|tag| tags.contains(tag)))
        .unwrap_or(TaskStatus::NoTag)
}

/// Categorization settings
///
/// The default performs no due-date inference, which keeps categorization a
/// pure function of the raw task and the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Categorizer {
    due_reference: Option<NaiveDate>,
}

impl Categorizer {
    /// Create categorizer without due-date inference
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Infer missing due dates from title phrases relative to `reference`
    #[inline]
    #[must_use]
    pub fn with_due_inference(mut self, reference: NaiveDate) -> Self {
        self.due_reference = Some(reference);
        self
    }

    /// Categorize one task
    #[must_use]
    pub fn categorize(&self, task: &RawTask, index: &PersonIndex) -> ProcessedTask {
        let tags = scan_tags(&task.title);
        let contexts = scan_contexts(&task.title);
        let priority = scan_priority(&task.title);
        let status = status_for(task.completed, &tags);
        let (clean_title, linked_people) = link_people(&strip_markup(&task.title), index);

        let (due, due_inferred) = match (task.due, self.due_reference) {
            (Some(due), _) => (Some(due), false),
            (None, Some(reference)) => {
                let inferred = infer_due(&task.title, reference);
                (inferred, inferred.is_some())
            }
            (None, None) => (None, false),
        };

        ProcessedTask {
            id: task.id.clone(),
            clean_title,
            original_title: task.title.clone(),
            tags,
            contexts,
            priority,
            linked_people,
            status,
            due,
            due_inferred,
            list: task.list.clone(),
            notes: task.notes.clone(),
            flagged: task.flagged,
        }
    }

    /// Categorize many tasks in parallel; output order matches input order
    #[must_use]
    pub fn categorize_all(&self, tasks: &[RawTask], index: &PersonIndex) -> Vec<ProcessedTask> {
        let processed: Vec<ProcessedTask> = tasks.par_iter().map(|t| self.categorize(t, index)).collect();
        tracing::debug!(tasks = processed.len(), "tasks categorized");
        processed
    }
}

/// Categorize one task with default settings
#[must_use]
pub fn categorize(task: &RawTask, index: &PersonIndex) -> ProcessedTask {
    Categorizer::new().categorize(task, index)
}

/// Categorize many tasks with default settings
#[must_use]
pub fn categorize_all(tasks: &[RawTask], index: &PersonIndex) -> Vec<ProcessedTask> {
    Categorizer::new().categorize_all(tasks, index)
}

/// Tasks per context, contexts in first-seen order
///
/// A task appears once under each of its contexts; tasks without contexts
/// are left out.
#[must_use]
pub fn group_by_context(tasks: &[ProcessedTask]) -> IndexMap<String, Vec<ProcessedTask>> {
    let mut groups: IndexMap<String, Vec<ProcessedTask>> = IndexMap::new();
    for task in tasks {
        for context in &task.contexts {
            groups.entry(context.clone()).or_default().push(task.clone());
        }
    }
    groups
}

/// Due date ordering: ascending, undated last
#[must_use]
pub fn due_order(a: &ProcessedTask, b: &ProcessedTask) -> Ordering {
    match (a.due, b.due) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by due date, undated tasks after dated ones
pub fn sort_by_due_date(tasks: &mut [ProcessedTask]) {
    tasks.sort_by(due_order);
}
