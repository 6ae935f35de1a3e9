//! GTD board: processed tasks bucketed for review

use crate::categorize::{group_by_context, sort_by_due_date};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write;
use vault_model::{Priority, ProcessedTask, TaskStatus};

/// Count of tasks per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GtdSummary {
    pub total: usize,
    pub completed: usize,
    pub inbox: usize,
    pub next: usize,
    pub waiting: usize,
    pub someday: usize,
    pub no_tag: usize,
    /// Open high-priority tasks
    pub urgent: usize,
}

/// Tasks grouped by status, urgency and context
#[derive(Debug, Clone, Default, Serialize)]
pub struct GtdBoard {
    /// One bucket per status in precedence order, each sorted by due date
    pub buckets: IndexMap<TaskStatus, Vec<ProcessedTask>>,
    /// Open high-priority tasks, sorted by due date
    pub urgent: Vec<ProcessedTask>,
    /// Open tasks per context
    pub by_context: IndexMap<String, Vec<ProcessedTask>>,
}

impl GtdBoard {
    /// Build from categorized tasks
    #[must_use]
    pub fn build(tasks: &[ProcessedTask]) -> Self {
        let mut buckets: IndexMap<TaskStatus, Vec<ProcessedTask>> =
            TaskStatus::ALL.into_iter().map(|s| (s, Vec::new())).collect();
        for task in tasks {
            buckets.entry(task.status).or_default().push(task.clone());
        }
        for bucket in buckets.values_mut() {
            sort_by_due_date(bucket);
        }

        let mut urgent: Vec<ProcessedTask> = tasks
            .iter()
            .filter(|t| t.is_open() && t.priority == Priority::High)
            .cloned()
            .collect();
        sort_by_due_date(&mut urgent);

        let open: Vec<ProcessedTask> = tasks.iter().filter(|t| t.is_open()).cloned().collect();
        let by_context = group_by_context(&open);

        Self {
            buckets,
            urgent,
            by_context,
        }
    }

    /// Tasks with `status`
    #[must_use]
    pub fn bucket(&self, status: TaskStatus) -> &[ProcessedTask] {
        self.buckets.get(&status).map(Vec::as_slice).unwrap_or_default()
    }

    /// Counts per status
    #[must_use]
    pub fn summary(&self) -> GtdSummary {
        let count = |s| self.bucket(s).len();
        GtdSummary {
            total: self.buckets.values().map(Vec::len).sum(),
            completed: count(TaskStatus::Completed),
            inbox: count(TaskStatus::Inbox),
            next: count(TaskStatus::Next),
            waiting: count(TaskStatus::Waiting),
            someday: count(TaskStatus::Someday),
            no_tag: count(TaskStatus::NoTag),
            urgent: self.urgent.len(),
        }
    }

    /// Markdown dashboard of open work
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let sections = [
            ("Urgent", self.urgent.as_slice()),
            ("Inbox", self.bucket(TaskStatus::Inbox)),
            ("Next Actions", self.bucket(TaskStatus::Next)),
            ("Waiting For", self.bucket(TaskStatus::Waiting)),
            ("Someday / Maybe", self.bucket(TaskStatus::Someday)),
        ];
        for (heading, tasks) in sections {
            let _ = writeln!(out, "## {heading}\n");
            if tasks.is_empty() {
                let _ = writeln!(out, "*None*\n");
                continue;
            }
            for task in tasks {
                let _ = write!(out, "- [ ] {}", task.clean_title);
                if let Some(due) = task.due {
                    let _ = write!(out, " (due {})", due.format("%Y-%m-%d"));
                }
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::categorize_all;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use vault_model::RawTask;
    use vault_people::PersonIndex;

    fn board() -> GtdBoard {
        let tasks = categorize_all(
            &[
                RawTask::new("1", "Triage mail #inbox"),
                RawTask::new("2", "Ship release #next !!").with_due(Utc.with_ymd_and_hms(2025, 8, 20, 0, 0, 0).unwrap()),
                RawTask::new("3", "Draft plan #next @desk"),
                RawTask::new("4", "Old thing #next !!").completed(),
                RawTask::new("5", "Learn piano #someday"),
                RawTask::new("6", "Untagged @desk"),
            ],
            &PersonIndex::new(),
        );
        GtdBoard::build(&tasks)
    }

    #[test]
    fn buckets_in_precedence_order() {
        let board = board();
        assert_eq!(board.buckets.keys().copied().collect::<Vec<_>>(), TaskStatus::ALL.to_vec());
        let next: Vec<_> = board.bucket(TaskStatus::Next).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(next, vec!["2", "3"]);
    }

    #[test]
    fn urgent_excludes_completed() {
        let board = board();
        assert_eq!(board.urgent.len(), 1);
        assert_eq!(board.urgent[0].id, "2");
    }

    #[test]
    fn summary_counts() {
        let summary = board().summary();
        assert_eq!(
            summary,
            GtdSummary {
                total: 6,
                completed: 1,
                inbox: 1,
                next: 2,
                waiting: 0,
                someday: 1,
                no_tag: 1,
                urgent: 1,
            }
        );
    }

    #[test]
    fn contexts_only_open_tasks() {
        let board = board();
        let desk: Vec<_> = board.by_context["desk"].iter().map(|t| t.id.as_str()).collect();
        assert_eq!(desk, vec!["3", "6"]);
    }

    #[test]
    fn markdown_sections() {
        let markdown = board().to_markdown();
        assert!(markdown.contains("## Next Actions\n\n- [ ] Ship release (due 2025-08-20)\n- [ ] Draft plan\n"));
        assert!(markdown.contains("## Waiting For\n\n*None*\n"));
    }
}
