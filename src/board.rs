//! Grouped project board: view assembly and the engine instance.
//!
//! [`Board`] owns the interactive state (collapsed groups, sort, filters,
//! selection) and recomputes a [`BoardView`] from the latest snapshot on every
//! call to [`Board::assemble`]. It never patches tasks locally; mutations go
//! through a [`TaskStore`] and show up once the caller supplies a fresh snapshot.
//!
//! Pipeline: filter projects, build the hierarchy against the full collection,
//! compute per-row metrics and group progress, then sort rows within each group.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::{FilterChange, FilterCriteria, filter_projects};
use crate::hierarchy::{self, DEFAULT_UNCLASSIFIED_LABEL};
use crate::metrics::Schedule;
use crate::models::{ProfileDirectory, Profile, Task, TaskPatch, TaskStatus};
use crate::progress::{ProjectProgress, activity_progress, group_progress};
use crate::selection::Selection;
use crate::sort::{SortKey, SortState, sort_rows};
use crate::store::{BulkOutcome, TaskStore, dispatch_bulk};
use crate::Result;

/// Derived per-row figures, computed fresh at assembly time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMetrics {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub business_days: u32,
    pub calendar_days: u32,
    pub progress_percent: u8,
    /// Not completed and due before `now`; independent of stored status
    pub is_overdue: bool,
}

impl RowMetrics {
    fn compute(task: &Task, progress_percent: u8, now: DateTime<Utc>) -> Self {
        let schedule = Schedule::of(task, now);
        Self {
            start: schedule.start,
            end: schedule.end,
            business_days: schedule.business_days,
            calendar_days: schedule.calendar_days,
            progress_percent,
            is_overdue: task.is_overdue(now),
        }
    }
}

/// An activity row under its project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRow {
    pub task: Task,
    pub assignee_name: Option<String>,
    pub metrics: RowMetrics,
}

/// A project row with its activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub task: Task,
    pub assignee_name: Option<String>,
    pub metrics: RowMetrics,
    pub activities: Vec<ActivityRow>,
}

/// One classification group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub name: String,
    /// Mean of member project progress
    pub progress: u8,
    pub collapsed: bool,
    pub projects: Vec<ProjectRow>,
}

/// Render-ready board: groups in name order, rows in sort order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub groups: Vec<GroupView>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl BoardView {
    /// IDs of rendered rows: each visible project followed by its activities,
    /// skipping collapsed groups.
    pub fn visible_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for group in self.groups.iter().filter(|g| !g.collapsed) {
            for row in &group.projects {
                ids.push(row.task.id.clone());
                ids.extend(row.activities.iter().map(|a| a.task.id.clone()));
            }
        }
        ids
    }

    /// Number of project rows across all groups, collapsed ones included.
    pub fn project_count(&self) -> usize {
        self.groups.iter().map(|g| g.projects.len()).sum()
    }

    /// Get a group by name.
    pub fn group(&self, name: &str) -> Option<&GroupView> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// Interactive state owned by one board instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    #[serde(default)]
    pub collapsed: BTreeSet<String>,
    #[serde(default)]
    pub sort: SortState,
    #[serde(default)]
    pub filter: FilterCriteria,
    #[serde(default)]
    pub selection: Selection,
}

/// Engine instance for one project board view.
#[derive(Debug, Clone)]
pub struct Board {
    state: BoardState,
    unclassified_label: String,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a board with default state.
    pub fn new() -> Self {
        Self {
            state: BoardState::default(),
            unclassified_label: DEFAULT_UNCLASSIFIED_LABEL.to_string(),
        }
    }

    /// Create a board with an initial sort and a custom unclassified bucket name.
    pub fn with_options(sort: SortState, unclassified_label: impl Into<String>) -> Self {
        Self {
            state: BoardState {
                sort,
                ..BoardState::default()
            },
            unclassified_label: unclassified_label.into(),
        }
    }

    /// Restore a board from previously saved state.
    pub fn from_state(state: BoardState, unclassified_label: impl Into<String>) -> Self {
        Self {
            state,
            unclassified_label: unclassified_label.into(),
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn unclassified_label(&self) -> &str {
        &self.unclassified_label
    }

    /// Build the grouped view from a snapshot, evaluated at `now`.
    pub fn assemble(&self, tasks: &[Task], profiles: &[Profile], now: DateTime<Utc>) -> BoardView {
        let directory = ProfileDirectory::new(profiles);
        let candidates = filter_projects(tasks, &self.state.filter, &directory);
        let buckets = hierarchy::build(&candidates, tasks, &self.unclassified_label);

        let groups: Vec<GroupView> = buckets
            .into_iter()
            .map(|bucket| {
                let mut rows: Vec<ProjectRow> = bucket
                    .projects
                    .iter()
                    .map(|node| {
                        let progress = ProjectProgress::of(node.project, &node.activities);
                        let activities = node
                            .activities
                            .iter()
                            .map(|&activity| ActivityRow {
                                task: activity.clone(),
                                assignee_name: directory.assignee_name(activity).map(str::to_string),
                                metrics: RowMetrics::compute(
                                    activity,
                                    activity_progress(activity),
                                    now,
                                ),
                            })
                            .collect();
                        ProjectRow {
                            task: node.project.clone(),
                            assignee_name: directory.assignee_name(node.project).map(str::to_string),
                            metrics: RowMetrics::compute(node.project, progress.percentage, now),
                            activities,
                        }
                    })
                    .collect();

                let progress = group_progress(rows.iter().map(|r| r.metrics.progress_percent));
                sort_rows(&mut rows, self.state.sort);
                GroupView {
                    collapsed: self.state.collapsed.contains(&bucket.name),
                    name: bucket.name,
                    progress,
                    projects: rows,
                }
            })
            .collect();

        tracing::debug!(
            groups = groups.len(),
            projects = candidates.len(),
            sort = %self.state.sort.key,
            "assembled board view"
        );
        BoardView {
            groups,
            evaluated_at: Some(now),
        }
    }

    /// Add or remove one row from the selection.
    pub fn on_toggle_select(&mut self, id: &str, included: bool) {
        self.state.selection.toggle(id, included);
    }

    /// Select or deselect every row currently visible in `view`.
    pub fn select_all_visible(&mut self, view: &BoardView, checked: bool) {
        self.state.selection.select_all_visible(&view.visible_ids(), checked);
    }

    /// Selected rows that are visible in `view`; hidden selections are not counted.
    pub fn selected_visible_count(&self, view: &BoardView) -> usize {
        self.state.selection.visible_count(&view.visible_ids())
    }

    /// Collapse an expanded group or expand a collapsed one.
    pub fn on_toggle_group_collapse(&mut self, name: &str) {
        if !self.state.collapsed.remove(name) {
            self.state.collapsed.insert(name.to_string());
        }
    }

    /// Sort by `key`, flipping direction when it is already the active key.
    pub fn on_sort(&mut self, key: SortKey) {
        self.state.sort.toggle(key);
    }

    /// Merge a partial filter change.
    pub fn on_filter_change(&mut self, change: FilterChange) {
        self.state.filter.apply_change(change);
    }

    /// Change the status of one task.
    pub async fn on_set_status<S: TaskStore>(&self, store: &S, id: &str, status: TaskStatus) -> Result<Task> {
        tracing::info!(id, status = %status, "setting task status");
        store.update_task(id, &TaskPatch::status(status)).await
    }

    /// Change the status of the given tasks concurrently.
    pub async fn on_bulk_set_status<S: TaskStore>(
        &self,
        store: &S,
        ids: &[String],
        status: TaskStatus,
    ) -> BulkOutcome {
        dispatch_bulk(store, ids, &TaskPatch::status(status)).await
    }

    /// Change the status of every selected task. The selection is left as is.
    pub async fn bulk_set_status<S: TaskStore>(&self, store: &S, status: TaskStatus) -> BulkOutcome {
        if self.state.selection.is_empty() {
            tracing::debug!("bulk update with nothing selected");
            return BulkOutcome::default();
        }
        self.on_bulk_set_status(store, &self.state.selection.ids(), status)
            .await
    }

    /// Reassign one task.
    pub async fn on_assign<S: TaskStore>(&self, store: &S, id: &str, profile_id: &str) -> Result<Task> {
        tracing::info!(id, profile_id, "assigning task");
        store.update_task(id, &TaskPatch::assign(profile_id)).await
    }

    /// Reassign the given tasks concurrently.
    pub async fn on_bulk_assign<S: TaskStore>(&self, store: &S, ids: &[String], profile_id: &str) -> BulkOutcome {
        dispatch_bulk(store, ids, &TaskPatch::assign(profile_id)).await
    }

    /// Reassign every selected task. The selection is left as is.
    pub async fn bulk_assign<S: TaskStore>(&self, store: &S, profile_id: &str) -> BulkOutcome {
        if self.state.selection.is_empty() {
            tracing::debug!("bulk update with nothing selected");
            return BulkOutcome::default();
        }
        self.on_bulk_assign(store, &self.state.selection.ids(), profile_id)
            .await
    }

    /// Turn a task into a project, recording the conversion as a comment.
    pub async fn convert_to_project<S: TaskStore>(
        &self,
        store: &S,
        task: &Task,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        let mut comments = task.comments.clone();
        comments.push(format!(
            "Tarefa convertida em projeto em {}",
            now.format("%d/%m/%Y %H:%M:%S")
        ));
        let patch = TaskPatch {
            is_project: Some(true),
            comments: Some(comments),
            ..TaskPatch::default()
        };
        tracing::info!(id = %task.id, "converting task to project");
        store.update_task(&task.id, &patch).await
    }

    /// Delegate a task to `assignee`, crediting `delegator` and noting why.
    pub async fn delegate<S: TaskStore>(
        &self,
        store: &S,
        task: &Task,
        assignee: &str,
        delegator: &str,
        note: Option<&str>,
    ) -> Result<Task> {
        let mut patch = TaskPatch {
            assigned_to: Some(assignee.to_string()),
            delegated_by: Some(delegator.to_string()),
            ..TaskPatch::default()
        };
        if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
            let mut comments = task.comments.clone();
            comments.push(format!("Tarefa delegada: {}", note));
            patch.comments = Some(comments);
        }
        tracing::info!(id = %task.id, assignee, delegator, "delegating task");
        store.update_task(&task.id, &patch).await
    }
}
