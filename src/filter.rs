//! Project filtering ahead of grouping.
//!
//! Four conjunctive predicates: status, priority, assignee and a
//! case-insensitive text search over title, description and assignee name.
//! Filters apply to projects only; activities follow their project.

use serde::{Deserialize, Serialize};

use crate::models::{Priority, ProfileDirectory, Task, TaskStatus};

/// Either every value passes, or only one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    /// Returns true if `value` passes this choice.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(expected) => expected == value,
        }
    }

    /// Like [`Choice::admits`] for optional values; `None` only passes `All`.
    pub fn admits_opt(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Choice::All, _) => true,
            (Choice::Only(expected), Some(value)) => expected == value,
            (Choice::Only(_), None) => false,
        }
    }
}

impl<T: std::str::FromStr> std::str::FromStr for Choice<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Choice::All)
        } else {
            s.parse().map(Choice::Only)
        }
    }
}

/// Active filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: Choice<TaskStatus>,
    #[serde(default)]
    pub priority: Choice<Priority>,
    /// Assignee profile ID
    #[serde(default)]
    pub assignee: Choice<String>,
}

/// Partial change to [`FilterCriteria`]; unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Choice<TaskStatus>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Choice<Priority>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Choice<String>>,
}

impl FilterCriteria {
    /// Apply a partial change.
    pub fn apply_change(&mut self, change: FilterChange) {
        if let Some(search) = change.search {
            self.search = search;
        }
        if let Some(status) = change.status {
            self.status = status;
        }
        if let Some(priority) = change.priority {
            self.priority = priority;
        }
        if let Some(assignee) = change.assignee {
            self.assignee = assignee;
        }
    }

    /// Returns true if no predicate restricts anything.
    pub fn is_unrestricted(&self) -> bool {
        self.search.trim().is_empty()
            && self.status == Choice::All
            && self.priority == Choice::All
            && self.assignee == Choice::All
    }

    /// Returns true if `task` passes every predicate.
    pub fn matches(&self, task: &Task, profiles: &ProfileDirectory) -> bool {
        self.status.admits(&task.status)
            && self.priority.admits(&task.priority)
            && self.assignee.admits_opt(task.assigned_to.as_ref())
            && self.matches_search(task, profiles)
    }

    fn matches_search(&self, task: &Task, profiles: &ProfileDirectory) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let fields = [
            Some(task.title.as_str()),
            task.description.as_deref(),
            profiles.assignee_name(task),
        ];
        fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Select the projects in `all` that pass `criteria`, in input order.
pub fn filter_projects<'a>(
    all: &'a [Task],
    criteria: &FilterCriteria,
    profiles: &ProfileDirectory,
) -> Vec<&'a Task> {
    let projects = all.iter().filter(|t| t.is_project());
    if criteria.is_unrestricted() {
        return projects.collect();
    }
    projects.filter(|t| criteria.matches(t, profiles)).collect()
}
