//! Data models for taskboard entities.
//!
//! This module defines the core data structures:
//! - `Task` - The single tracked entity; a project, an activity, or a standalone task
//! - `Profile` - Read-only people directory entry used to resolve assignee names
//! - `Classification` - Named bucket a project belongs to
//! - `TaskPatch` - Partial update sent to the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Task priority, ordered from least to most pressing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Baixa,
    #[default]
    Media,
    Alta,
    Urgente,
}

impl Priority {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Baixa => "baixa",
            Priority::Media => "media",
            Priority::Alta => "alta",
            Priority::Urgente => "urgente",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baixa" => Ok(Priority::Baixa),
            "media" => Ok(Priority::Media),
            "alta" => Ok(Priority::Alta),
            "urgente" => Ok(Priority::Urgente),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Stored task status.
///
/// `Atrasada` is a label carried by the data; it is never derived from the
/// due date. See [`Task::is_overdue`] for the computed flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pendente,
    EmProgresso,
    Concluida,
    Atrasada,
}

impl TaskStatus {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pendente => "pendente",
            TaskStatus::EmProgresso => "em_progresso",
            TaskStatus::Concluida => "concluida",
            TaskStatus::Atrasada => "atrasada",
        }
    }

    /// Display label with underscores replaced by spaces.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Get all statuses in declaration order.
    pub fn all() -> &'static [TaskStatus] {
        &[
            TaskStatus::Pendente,
            TaskStatus::EmProgresso,
            TaskStatus::Concluida,
            TaskStatus::Atrasada,
        ]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pendente" => Ok(TaskStatus::Pendente),
            "em_progresso" | "em-progresso" => Ok(TaskStatus::EmProgresso),
            "concluida" => Ok(TaskStatus::Concluida),
            "atrasada" => Ok(TaskStatus::Atrasada),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// Role of a profile in the organisation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Gestao,
    Supervisao,
    #[default]
    Usuario,
}

/// A person tasks can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    #[serde(default)]
    pub role: UserRole,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

impl Profile {
    /// Create a new profile with the given ID and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: UserRole::default(),
            sector: None,
        }
    }
}

/// Named bucket used to group projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Classification {
    /// Create a new classification with the given ID and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
            description: None,
        }
    }
}

/// A work item as supplied by the data store.
///
/// A task is a *project* when `is_project` is set and an *activity* when it
/// carries a `project_id`. Timestamps that fail to parse are read as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque unique identifier
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_id: Option<String>,

    /// Classification joined in by the store, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Assignee profile ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegated_by: Option<String>,

    /// Assignee profile joined in by the store, if any
    #[serde(
        default,
        alias = "assigned_to_profile",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee_profile: Option<Profile>,

    #[serde(default, deserialize_with = "lenient_instant")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient_instant")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient_instant")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_project: bool,

    /// Parent project ID when this task is an activity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Free-text comments, oldest first
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Task {
    /// Create a new pending task with the given ID and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            classification_id: None,
            classification: None,
            priority: Priority::default(),
            status: TaskStatus::default(),
            created_by: None,
            assigned_to: None,
            delegated_by: None,
            assignee_profile: None,
            created_at: Some(Utc::now()),
            due_date: None,
            completed_at: None,
            is_project: false,
            project_id: None,
            comments: Vec::new(),
        }
    }

    /// Returns true if this task is a project.
    pub fn is_project(&self) -> bool {
        self.is_project
    }

    /// Returns true if this task is an activity of some project.
    pub fn is_activity(&self) -> bool {
        self.project_id.is_some()
    }

    /// Returns true if the stored status is `concluida`.
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Concluida
    }

    /// Computed overdue flag: not completed and due strictly before `now`.
    ///
    /// Independent of the stored `atrasada` status.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.due_date.is_some_and(|due| due < now)
    }

    /// Name of the joined classification, if any.
    pub fn classification_name(&self) -> Option<&str> {
        self.classification.as_ref().map(|c| c.name.as_str())
    }

    /// First comment, shown as the row's observation.
    pub fn first_comment(&self) -> Option<&str> {
        self.comments.first().map(String::as_str)
    }
}

fn lenient_instant<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(crate::metrics::parse_instant))
}

/// Partial update for a single task. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegated_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_project: Option<bool>,

    /// Replacement comment list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// Patch that only changes the status.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Patch that only changes the assignee.
    pub fn assign(profile_id: impl Into<String>) -> Self {
        Self {
            assigned_to: Some(profile_id.into()),
            ..Self::default()
        }
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this patch into `task`.
    ///
    /// A joined assignee profile that no longer matches the new assignee is dropped.
    pub fn apply(&self, task: &mut Task) {
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(ref assignee) = self.assigned_to {
            if task
                .assignee_profile
                .as_ref()
                .is_some_and(|p| &p.id != assignee)
            {
                task.assignee_profile = None;
            }
            task.assigned_to = Some(assignee.clone());
        }
        if let Some(ref delegator) = self.delegated_by {
            task.delegated_by = Some(delegator.clone());
        }
        if let Some(is_project) = self.is_project {
            task.is_project = is_project;
        }
        if let Some(ref comments) = self.comments {
            task.comments = comments.clone();
        }
        if let Some(completed_at) = self.completed_at {
            task.completed_at = Some(completed_at);
        }
    }
}

/// Lookup table from profile ID to profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileDirectory {
    by_id: HashMap<String, Profile>,
}

impl ProfileDirectory {
    /// Build a directory from a profile list. Later duplicates win.
    pub fn new(profiles: &[Profile]) -> Self {
        Self {
            by_id: profiles
                .iter()
                .map(|p| (p.id.clone(), p.clone()))
                .collect(),
        }
    }

    /// Get a profile by ID.
    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.by_id.get(id)
    }

    /// Resolve the display name of a task's assignee.
    ///
    /// Prefers the profile joined onto the task, then the directory.
    pub fn assignee_name<'a>(&'a self, task: &'a Task) -> Option<&'a str> {
        if let Some(ref profile) = task.assignee_profile {
            return Some(profile.name.as_str());
        }
        task.assigned_to
            .as_deref()
            .and_then(|id| self.get(id))
            .map(|p| p.name.as_str())
    }
}
