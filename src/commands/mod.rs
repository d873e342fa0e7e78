//! Command implementations for the taskboard CLI.
//!
//! Each command loads what it needs from a [`TaskStore`], runs the engine and
//! returns a result type implementing [`Output`]. Mutating commands write the
//! snapshot back when at least one update succeeded.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::board::{ActivityRow, Board, BoardView, GroupView, ProjectRow, RowMetrics};
use crate::config::{BoardConfig, KEYS, ResolvedConfig, ValueSource};
use crate::filter::{Choice, FilterChange};
use crate::hierarchy::orphaned_activities;
use crate::metrics::{Clock, format_short_date};
use crate::models::{Priority, Task, TaskStatus};
use crate::stats::{StatusBuckets, TaskStats, recent_open_tasks, status_buckets};
use crate::store::{BulkOutcome, SnapshotStore, TaskStore};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

// === Report ===

/// Filter and layout options for `tb report`.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub search: Option<String>,
    pub status: Option<Choice<TaskStatus>>,
    pub priority: Option<Choice<Priority>>,
    pub assignee: Option<Choice<String>>,
    pub collapse: Vec<String>,
}

/// Assembled board for `tb report`.
#[derive(Debug, Serialize)]
pub struct ReportResult {
    pub evaluated_at: DateTime<Utc>,
    pub sort: String,
    pub direction: String,
    pub project_count: usize,
    pub groups: Vec<GroupView>,
    pub visible_ids: Vec<String>,
}

impl ReportResult {
    fn from_view(view: BoardView, board: &Board, now: DateTime<Utc>) -> Self {
        let sort = board.state().sort;
        Self {
            evaluated_at: now,
            sort: sort.key.to_string(),
            direction: sort.direction.as_str().to_string(),
            project_count: view.project_count(),
            visible_ids: view.visible_ids(),
            groups: view.groups,
        }
    }
}

fn row_line(indent: &str, task: &Task, assignee: Option<&str>, metrics: &RowMetrics) -> String {
    let mut line = format!(
        "{}{} {} [{}] {}% {} -> {} ({} bd, {} d) {}",
        indent,
        task.id,
        task.title,
        task.status.label(),
        metrics.progress_percent,
        format_short_date(Some(metrics.start)),
        format_short_date(Some(metrics.end)),
        metrics.business_days,
        metrics.calendar_days,
        assignee.unwrap_or("-"),
    );
    if metrics.is_overdue {
        line.push_str(" OVERDUE");
    }
    if let Some(note) = task.first_comment() {
        line.push_str(&format!(" | {}", note));
    }
    line
}

fn project_lines(row: &ProjectRow) -> Vec<String> {
    let mut lines = vec![row_line("  ", &row.task, row.assignee_name.as_deref(), &row.metrics)];
    lines.extend(
        row.activities
            .iter()
            .map(|a: &ActivityRow| row_line("    - ", &a.task, a.assignee_name.as_deref(), &a.metrics)),
    );
    lines
}

impl Output for ReportResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        if self.groups.is_empty() {
            return "No projects found.".to_string();
        }
        let mut lines = Vec::new();
        for group in &self.groups {
            let marker = if group.collapsed { "+" } else { "-" };
            lines.push(format!(
                "{} {} ({} projects, {}%)",
                marker,
                group.name,
                group.projects.len(),
                group.progress
            ));
            if !group.collapsed {
                for row in &group.projects {
                    lines.extend(project_lines(row));
                }
            }
        }
        lines.push(format!(
            "{} projects, sorted by {} {}",
            self.project_count, self.sort, self.direction
        ));
        lines.join("\n")
    }
}

/// Assemble the grouped project report.
pub async fn report<S: TaskStore>(
    store: &S,
    config: &ResolvedConfig,
    options: ReportOptions,
    clock: &dyn Clock,
) -> Result<ReportResult> {
    let (tasks, profiles) = futures::try_join!(store.fetch_tasks(), store.fetch_profiles(None))?;

    let mut board = Board::with_options(config.sort_state(), config.unclassified_label());
    board.on_filter_change(FilterChange {
        search: options.search,
        status: options.status,
        priority: options.priority,
        assignee: options.assignee,
    });
    for name in &options.collapse {
        board.on_toggle_group_collapse(name);
    }

    let now = clock.now();
    let view = board.assemble(&tasks, &profiles, now);
    for name in &options.collapse {
        if view.group(name).is_none() {
            tracing::warn!(group = %name, "collapsed group is not on the board");
        }
    }
    Ok(ReportResult::from_view(view, &board, now))
}

// === Stats ===

/// Open task summary line for `tb stats`.
#[derive(Debug, Serialize)]
pub struct RecentTask {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Task> for RecentTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
            priority: task.priority,
            created_at: task.created_at,
        }
    }
}

/// Dashboard statistics for `tb stats`.
#[derive(Debug, Serialize)]
pub struct StatsResult {
    #[serde(flatten)]
    pub stats: TaskStats,
    pub buckets: StatusBuckets,
    pub recent: Vec<RecentTask>,
}

impl Output for StatsResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let s = &self.stats;
        let mut lines = vec![
            format!("Total: {} ({}% complete, {} concluida)", s.total, s.completion_rate, s.completed),
            format!("In progress: {} (+{} pendente)", s.in_progress, s.pending),
            format!("Overdue: {}  Urgent: {} ({}%)", s.overdue, s.urgent, s.urgent_rate),
            format!("Projects: {}  Assigned: {}", s.projects, s.assigned),
        ];
        if self.recent.is_empty() {
            lines.push("No open tasks.".to_string());
        } else {
            lines.push("Recent open tasks:".to_string());
            for task in &self.recent {
                lines.push(format!(
                    "  {} {} [{}] {} {}",
                    task.id,
                    task.title,
                    task.status.label(),
                    task.priority,
                    format_short_date(task.created_at)
                ));
            }
        }
        lines.join("\n")
    }
}

/// Compute dashboard statistics.
pub async fn stats<S: TaskStore>(store: &S, limit: usize, clock: &dyn Clock) -> Result<StatsResult> {
    let tasks = store.fetch_tasks().await?;
    let now = clock.now();
    Ok(StatsResult {
        stats: TaskStats::compute(&tasks, now),
        buckets: status_buckets(&tasks, now),
        recent: recent_open_tasks(&tasks, limit)
            .into_iter()
            .map(RecentTask::from)
            .collect(),
    })
}

// === Orphans ===

/// Activity pointing at a missing project.
#[derive(Debug, Serialize)]
pub struct OrphanEntry {
    pub id: String,
    pub title: String,
    pub project_id: String,
}

/// Result of `tb orphans`.
#[derive(Debug, Serialize)]
pub struct OrphansResult {
    pub count: usize,
    pub orphans: Vec<OrphanEntry>,
}

impl Output for OrphansResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        if self.orphans.is_empty() {
            return "No orphaned activities.".to_string();
        }
        let mut lines = vec![format!("{} orphaned activities:", self.count)];
        for orphan in &self.orphans {
            lines.push(format!(
                "  {} {} (missing project {})",
                orphan.id, orphan.title, orphan.project_id
            ));
        }
        lines.join("\n")
    }
}

/// List activities whose project reference dangles.
pub async fn orphans<S: TaskStore>(store: &S) -> Result<OrphansResult> {
    let tasks = store.fetch_tasks().await?;
    let orphans: Vec<OrphanEntry> = orphaned_activities(&tasks)
        .into_iter()
        .map(|t| OrphanEntry {
            id: t.id.clone(),
            title: t.title.clone(),
            project_id: t.project_id.clone().unwrap_or_default(),
        })
        .collect();
    Ok(OrphansResult {
        count: orphans.len(),
        orphans,
    })
}

// === Mutations ===

/// Settled bulk update.
#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub action: String,
    pub requested: usize,
    #[serde(flatten)]
    pub outcome: BulkOutcome,
}

impl BulkResult {
    /// Error to report when any request failed, naming the failed IDs.
    pub fn failure(&self) -> Option<Error> {
        if self.outcome.is_success() {
            return None;
        }
        Some(Error::Store(format!(
            "{} of {} updates failed: {}",
            self.outcome.failed.len(),
            self.outcome.total(),
            self.outcome.failed_ids().join(", ")
        )))
    }
}

impl Output for BulkResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{}: {} updated, {} failed",
            self.action,
            self.outcome.succeeded.len(),
            self.outcome.failed.len()
        )];
        for failure in &self.outcome.failed {
            lines.push(format!("  {} - {}", failure.id, failure.reason));
        }
        lines.join("\n")
    }
}

/// Single task after an update.
#[derive(Debug, Serialize)]
pub struct TaskUpdated {
    pub action: String,
    pub task: Task,
}

impl Output for TaskUpdated {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut line = format!("{} {}: {}", self.action, self.task.id, self.task.title);
        if let Some(ref assignee) = self.task.assigned_to {
            line.push_str(&format!(" (assigned to {})", assignee));
        }
        line
    }
}

fn persist(store: &SnapshotStore, outcome: &BulkOutcome) -> Result<()> {
    if !outcome.succeeded.is_empty() {
        store.save()?;
    }
    Ok(())
}

/// Board with `ids` selected; bulk requests go out in ID order.
fn selecting(ids: &[String]) -> Board {
    let mut board = Board::new();
    for id in ids {
        board.on_toggle_select(id, true);
    }
    board
}

/// Set the status of each task in `ids`.
pub async fn set_status(store: &SnapshotStore, ids: &[String], status: TaskStatus) -> Result<BulkResult> {
    let board = selecting(ids);
    let outcome = board.bulk_set_status(store, status).await;
    persist(store, &outcome)?;
    Ok(BulkResult {
        action: format!("set-status {}", status),
        requested: board.state().selection.len(),
        outcome,
    })
}

/// Assign each task in `ids` to `profile_id`. The profile must exist.
pub async fn assign(store: &SnapshotStore, ids: &[String], profile_id: &str) -> Result<BulkResult> {
    let wanted = [profile_id.to_string()];
    if store.fetch_profiles(Some(wanted.as_slice())).await?.is_empty() {
        return Err(Error::NotFound(format!("Profile not found: {}", profile_id)));
    }
    let board = selecting(ids);
    let outcome = board.bulk_assign(store, profile_id).await;
    persist(store, &outcome)?;
    Ok(BulkResult {
        action: format!("assign {}", profile_id),
        requested: board.state().selection.len(),
        outcome,
    })
}

async fn find_task(store: &SnapshotStore, id: &str) -> Result<Task> {
    store
        .fetch_tasks()
        .await?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::NotFound(format!("Task not found: {}", id)))
}

/// Convert a task into a project.
pub async fn convert(store: &SnapshotStore, id: &str, clock: &dyn Clock) -> Result<TaskUpdated> {
    let task = find_task(store, id).await?;
    if task.is_project {
        return Err(Error::InvalidInput(format!("Task {} is already a project", id)));
    }
    let task = Board::new().convert_to_project(store, &task, clock.now()).await?;
    store.save()?;
    Ok(TaskUpdated {
        action: "Converted".to_string(),
        task,
    })
}

/// Delegate a task to `assignee` on behalf of `delegator`.
pub async fn delegate(
    store: &SnapshotStore,
    id: &str,
    assignee: &str,
    delegator: &str,
    note: Option<&str>,
) -> Result<TaskUpdated> {
    let task = find_task(store, id).await?;
    let wanted = [assignee.to_string()];
    if store.fetch_profiles(Some(wanted.as_slice())).await?.is_empty() {
        return Err(Error::NotFound(format!("Profile not found: {}", assignee)));
    }
    let task = Board::new().delegate(store, &task, assignee, delegator, note).await?;
    store.save()?;
    Ok(TaskUpdated {
        action: "Delegated".to_string(),
        task,
    })
}

// === Config ===

/// One resolved setting.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

impl ConfigEntry {
    fn new(key: &str, value: impl ToString, source: &ValueSource) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            source: source.to_string(),
        }
    }
}

impl Output for ConfigEntry {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!("{} = {} ({})", self.key, self.value, self.source)
    }
}

/// Result of `tb config list`.
#[derive(Debug, Serialize)]
pub struct ConfigList {
    pub entries: Vec<ConfigEntry>,
}

impl Output for ConfigList {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        self.entries
            .iter()
            .map(ConfigEntry::to_human)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Result of `tb config set`.
#[derive(Debug, Serialize)]
pub struct ConfigSet {
    pub key: String,
    pub value: String,
    pub path: String,
}

impl Output for ConfigSet {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {} in {}", self.key, self.value, self.path)
    }
}

fn config_entries(config: &ResolvedConfig) -> Vec<ConfigEntry> {
    vec![
        ConfigEntry::new(
            "unclassified-label",
            &config.unclassified_label.value,
            &config.unclassified_label.source,
        ),
        ConfigEntry::new("default-sort", config.sort_key.value, &config.sort_key.source),
        ConfigEntry::new(
            "default-direction",
            config.sort_direction.value.as_str(),
            &config.sort_direction.source,
        ),
        ConfigEntry::new("recent-limit", config.recent_limit.value, &config.recent_limit.source),
        ConfigEntry::new("log-level", &config.log_level.value, &config.log_level.source),
    ]
}

/// List every setting with its source.
pub fn config_list(config: &ResolvedConfig) -> ConfigList {
    ConfigList {
        entries: config_entries(config),
    }
}

/// Look up one setting.
pub fn config_get(config: &ResolvedConfig, key: &str) -> Result<ConfigEntry> {
    config_entries(config)
        .into_iter()
        .find(|entry| entry.key == key)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "Unknown config key: {} (expected one of: {})",
                key,
                KEYS.join(", ")
            ))
        })
}

/// Write one setting into the config file at `path`, keeping the others.
pub fn config_set(path: &Path, key: &str, value: &str) -> Result<ConfigSet> {
    let change = BoardConfig::from_setting(key, value)?;
    let mut file = BoardConfig::load(path)?;
    file.merge(&change);
    file.validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    file.save(path)?;
    tracing::info!(path = %path.display(), key, "config updated");
    Ok(ConfigSet {
        key: key.to_string(),
        value: value.to_string(),
        path: path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoardConfig, ConfigOverrides, resolve_with};
    use crate::metrics::FixedClock;
    use crate::models::{Classification, Profile};
    use crate::sort::{SortDirection, SortKey};
    use crate::store::Snapshot;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn fixture() -> Snapshot {
        let mut p1 = Task::new("P1", "Website");
        p1.is_project = true;
        p1.created_at = Some(at(2024, 1, 1));
        p1.due_date = Some(at(2024, 1, 10));
        p1.classification = Some(Classification::new("c1", "Ops"));
        p1.assigned_to = Some("u1".to_string());
        p1.comments.push("kickoff done".to_string());

        let mut a1 = Task::new("A1", "Design");
        a1.project_id = Some("P1".to_string());
        a1.status = TaskStatus::Concluida;
        let mut a2 = Task::new("A2", "Build");
        a2.project_id = Some("P1".to_string());

        let mut p2 = Task::new("P2", "Audit");
        p2.is_project = true;
        p2.created_at = Some(at(2024, 1, 5));

        let mut stray = Task::new("S1", "Stray");
        stray.project_id = Some("gone".to_string());

        Snapshot {
            tasks: vec![p1, a1, a2, p2, stray],
            profiles: vec![Profile::new("u1", "Ana"), Profile::new("u2", "Bruno")],
        }
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn file_store(dir: &TempDir) -> SnapshotStore {
        let path = dir.path().join("snapshot.json");
        fixture().save(&path).unwrap();
        SnapshotStore::open(&path).unwrap()
    }

    fn defaults() -> ResolvedConfig {
        resolve_with(&BoardConfig::default(), "config.kdl", &ConfigOverrides::new())
    }

    #[tokio::test]
    async fn test_report_groups_and_sorts() {
        let store = SnapshotStore::new(fixture());
        let result = report(&store, &defaults(), ReportOptions::default(), &FixedClock(at(2024, 2, 1)))
            .await
            .unwrap();

        let names: Vec<&str> = result.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Ops", "Sem classificação"]);
        assert_eq!(result.groups[0].progress, 50);
        assert_eq!(result.project_count, 2);
        assert_eq!(result.visible_ids, ids(&["P1", "A1", "A2", "P2"]));
        assert_eq!(result.groups[0].projects[0].assignee_name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_report_respects_sort_override_and_collapse() {
        let store = SnapshotStore::new(fixture());
        let overrides = ConfigOverrides::new()
            .with_sort_key(SortKey::Progress)
            .with_sort_direction(SortDirection::Desc);
        let config = resolve_with(&BoardConfig::default(), "config.kdl", &overrides);
        let options = ReportOptions {
            collapse: vec!["Ops".to_string()],
            ..ReportOptions::default()
        };

        let result = report(&store, &config, options, &FixedClock(at(2024, 2, 1))).await.unwrap();
        assert_eq!(result.sort, "progress");
        assert_eq!(result.direction, "desc");
        assert!(result.groups[0].collapsed);
        assert_eq!(result.visible_ids, ids(&["P2"]));

        let human = result.to_human();
        assert!(human.contains("+ Ops (1 projects, 50%)"));
        assert!(!human.contains("Website"));
    }

    #[tokio::test]
    async fn test_report_human_rows() {
        let store = SnapshotStore::new(fixture());
        let result = report(&store, &defaults(), ReportOptions::default(), &FixedClock(at(2024, 2, 1)))
            .await
            .unwrap();
        let human = result.to_human();
        assert!(human.contains("P1 Website [pendente] 50% 01/01/24 -> 10/01/24 (8 bd, 9 d) Ana OVERDUE | kickoff done"));
        assert!(human.contains("    - A1 Design [concluida] 100%"));
    }

    #[tokio::test]
    async fn test_report_search_filter() {
        let store = SnapshotStore::new(fixture());
        let options = ReportOptions {
            search: Some("ana".to_string()),
            ..ReportOptions::default()
        };
        let result = report(&store, &defaults(), options, &FixedClock(at(2024, 2, 1))).await.unwrap();
        assert_eq!(result.project_count, 1);

        let options = ReportOptions {
            search: Some("nothing matches".to_string()),
            ..ReportOptions::default()
        };
        let result = report(&store, &defaults(), options, &FixedClock(at(2024, 2, 1))).await.unwrap();
        assert!(result.groups.is_empty());
        assert_eq!(result.to_human(), "No projects found.");
    }

    #[tokio::test]
    async fn test_stats_command() {
        let store = SnapshotStore::new(fixture());
        let result = stats(&store, 2, &FixedClock(at(2024, 2, 1))).await.unwrap();
        assert_eq!(result.stats.total, 5);
        assert_eq!(result.stats.completed, 1);
        assert_eq!(result.stats.projects, 2);
        assert_eq!(result.recent.len(), 2);

        let json: serde_json::Value = serde_json::from_str(&result.to_json()).unwrap();
        assert_eq!(json["total"], 5);
        assert_eq!(json["buckets"]["overdue"], 1);
    }

    #[tokio::test]
    async fn test_orphans_command() {
        let store = SnapshotStore::new(fixture());
        let result = orphans(&store).await.unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.orphans[0].id, "S1");
        assert_eq!(result.orphans[0].project_id, "gone");
        assert!(result.to_human().contains("missing project gone"));
    }

    #[tokio::test]
    async fn test_set_status_reports_failures_and_saves() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        let result = set_status(&store, &ids(&["A2", "nope", "P2"]), TaskStatus::Concluida)
            .await
            .unwrap();
        assert_eq!(result.outcome.succeeded, ids(&["A2", "P2"]));
        assert_eq!(result.outcome.failed_ids(), ids(&["nope"]));
        assert!(result.failure().unwrap().to_string().contains("nope"));

        // Repeated IDs are requested once
        let again = set_status(&store, &ids(&["P2", "P2"]), TaskStatus::Pendente).await.unwrap();
        assert_eq!(again.requested, 1);
        assert!(again.failure().is_none());

        let saved = Snapshot::load(&dir.path().join("snapshot.json")).unwrap();
        let a2 = saved.tasks.iter().find(|t| t.id == "A2").unwrap();
        assert_eq!(a2.status, TaskStatus::Concluida);
        assert!(a2.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_assign_requires_known_profile() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        let err = assign(&store, &ids(&["P2"]), "ghost").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let result = assign(&store, &ids(&["P2", "A1"]), "u2").await.unwrap();
        assert!(result.failure().is_none());
        assert_eq!(result.to_human(), "assign u2: 2 updated, 0 failed");
    }

    #[tokio::test]
    async fn test_convert_command() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        let now = Utc.with_ymd_and_hms(2024, 4, 2, 8, 30, 0).unwrap();

        let result = convert(&store, "S1", &FixedClock(now)).await.unwrap();
        assert!(result.task.is_project);
        assert_eq!(
            result.task.comments.last().map(String::as_str),
            Some("Tarefa convertida em projeto em 02/04/2024 08:30:00")
        );

        let err = convert(&store, "P1", &FixedClock(now)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(matches!(convert(&store, "zzz", &FixedClock(now)).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delegate_command() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        let result = delegate(&store, "A2", "u2", "u1", Some("ferias")).await.unwrap();
        assert_eq!(result.task.assigned_to.as_deref(), Some("u2"));
        assert_eq!(result.task.delegated_by.as_deref(), Some("u1"));
        assert_eq!(result.to_human(), "Delegated A2: Build (assigned to u2)");

        let saved = Snapshot::load(&dir.path().join("snapshot.json")).unwrap();
        let a2 = saved.tasks.iter().find(|t| t.id == "A2").unwrap();
        assert_eq!(a2.comments, vec!["Tarefa delegada: ferias".to_string()]);
    }

    #[test]
    fn test_config_list_and_get() {
        let file = BoardConfig {
            recent_limit: Some(9),
            ..Default::default()
        };
        let config = resolve_with(&file, "cfg.kdl", &ConfigOverrides::new());

        let list = config_list(&config);
        let keys: Vec<&str> = list.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, KEYS.to_vec());

        let limit = config_get(&config, "recent-limit").unwrap();
        assert_eq!(limit.value, "9");
        assert_eq!(limit.source, "file:cfg.kdl");
        assert_eq!(
            config_get(&config, "default-sort").unwrap().to_human(),
            "default-sort = title (default)"
        );
        assert!(matches!(config_get(&config, "nope"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_config_set_merges_into_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskboard").join("config.kdl");

        config_set(&path, "default-sort", "progress").unwrap();
        config_set(&path, "recent-limit", "7").unwrap();

        let saved = BoardConfig::load(&path).unwrap();
        assert_eq!(saved.default_sort, Some(SortKey::Progress));
        assert_eq!(saved.recent_limit, Some(7));

        // Invalid values leave the file untouched
        let err = config_set(&path, "recent-limit", "0").unwrap_err();
        assert!(err.to_string().contains("recent-limit must be 1-100, got 0"));
        assert_eq!(BoardConfig::load(&path).unwrap().recent_limit, Some(7));
    }
}
