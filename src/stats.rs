//! Dashboard statistics over a task snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Priority, Task, TaskStatus};
use crate::progress::round_percent;

/// Headline counts for a task collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    /// Computed from the due date, not the stored `atrasada` status
    pub overdue: usize,
    pub urgent: usize,
    pub projects: usize,
    pub assigned: usize,
    pub completion_rate: u8,
    pub urgent_rate: u8,
}

impl TaskStats {
    /// Count `tasks` as evaluated at `now`.
    pub fn compute(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let count = |pred: fn(&Task) -> bool| tasks.iter().filter(|t| pred(t)).count();

        let total = tasks.len();
        let completed = count(|t| t.status == TaskStatus::Concluida);
        let urgent = count(|t| t.priority == Priority::Urgente);
        Self {
            total,
            completed,
            in_progress: count(|t| t.status == TaskStatus::EmProgresso),
            pending: count(|t| t.status == TaskStatus::Pendente),
            overdue: tasks.iter().filter(|t| t.is_overdue(now)).count(),
            urgent,
            projects: count(|t| t.is_project),
            assigned: count(|t| t.assigned_to.is_some()),
            completion_rate: round_percent(completed, total),
            urgent_rate: round_percent(urgent, total),
        }
    }
}

/// Per-status counts with the computed overdue count kept apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBuckets {
    /// Stored status -> count, every status present
    pub by_status: BTreeMap<TaskStatus, usize>,
    pub overdue: usize,
}

/// Count tasks per stored status.
pub fn status_buckets(tasks: &[Task], now: DateTime<Utc>) -> StatusBuckets {
    let mut by_status: BTreeMap<TaskStatus, usize> =
        TaskStatus::all().iter().map(|s| (*s, 0)).collect();
    let mut overdue = 0;
    for task in tasks {
        *by_status.entry(task.status).or_insert(0) += 1;
        if task.is_overdue(now) {
            overdue += 1;
        }
    }
    StatusBuckets { by_status, overdue }
}

/// Open tasks, newest first, at most `limit` of them. Undated tasks come last.
pub fn recent_open_tasks(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut open: Vec<&Task> = tasks.iter().filter(|t| !t.is_completed()).collect();
    // Option orders None first, so reversing puts undated tasks last
    open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    open.truncate(limit);
    open
}
