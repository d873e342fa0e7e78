//! Project/activity hierarchy reconstruction.
//!
//! Projects are grouped into classification buckets and matched with their
//! activities. Activities are always looked up in the complete collection so
//! that filtering a project never skews its own roll-up.

use std::collections::{HashMap, HashSet};

use crate::models::Task;
use crate::sort::collate;

/// Bucket name used for projects without a classification.
pub const DEFAULT_UNCLASSIFIED_LABEL: &str = "Sem classificação";

/// A project together with its activities, in input order.
#[derive(Debug, Clone)]
pub struct ProjectNode<'a> {
    pub project: &'a Task,
    pub activities: Vec<&'a Task>,
}

/// A named classification bucket of projects.
#[derive(Debug, Clone)]
pub struct Bucket<'a> {
    pub name: String,
    pub projects: Vec<ProjectNode<'a>>,
}

/// Bucket key of a project: its classification name, or `unclassified`.
pub fn bucket_key<'a>(task: &'a Task, unclassified: &'a str) -> &'a str {
    match task.classification_name() {
        Some(name) if !name.trim().is_empty() => name,
        _ => unclassified,
    }
}

/// Index of activities by parent project ID, preserving input order.
#[derive(Debug, Default)]
pub struct ActivityIndex<'a> {
    by_project: HashMap<&'a str, Vec<&'a Task>>,
}

impl<'a> ActivityIndex<'a> {
    /// Index every task in `all` that carries a project reference.
    pub fn new(all: &'a [Task]) -> Self {
        let mut by_project: HashMap<&'a str, Vec<&'a Task>> = HashMap::new();
        for task in all.iter().filter(|t| t.is_activity()) {
            if let Some(ref parent) = task.project_id {
                by_project.entry(parent.as_str()).or_default().push(task);
            }
        }
        Self { by_project }
    }

    /// Activities of the given project, empty when it has none.
    pub fn activities_of(&self, project_id: &str) -> &[&'a Task] {
        self.by_project
            .get(project_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Group candidate projects into buckets ordered by name.
///
/// `candidates` is the filtered project set; `all` is the unfiltered task
/// collection activities are matched against. Project order within a bucket
/// follows `candidates`.
pub fn build<'a>(candidates: &[&'a Task], all: &'a [Task], unclassified: &str) -> Vec<Bucket<'a>> {
    let index = ActivityIndex::new(all);
    let mut buckets: Vec<Bucket<'a>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for &project in candidates {
        let key = bucket_key(project, unclassified);
        let slot = match positions.get(key) {
            Some(&slot) => slot,
            None => {
                buckets.push(Bucket {
                    name: key.to_string(),
                    projects: Vec::new(),
                });
                positions.insert(key.to_string(), buckets.len() - 1);
                buckets.len() - 1
            }
        };
        buckets[slot].projects.push(ProjectNode {
            project,
            activities: index.activities_of(&project.id).to_vec(),
        });
    }

    buckets.sort_by(|a, b| collate(&a.name, &b.name));
    tracing::debug!(
        buckets = buckets.len(),
        projects = candidates.len(),
        "built project hierarchy"
    );
    buckets
}

/// Activities whose project reference matches no task in `all`.
///
/// These never appear under any project.
pub fn orphaned_activities(all: &[Task]) -> Vec<&Task> {
    let ids: HashSet<&str> = all.iter().map(|t| t.id.as_str()).collect();
    let orphans: Vec<&Task> = all
        .iter()
        .filter(|t| t.is_activity())
        .filter(|t| {
            t.project_id
                .as_deref()
                .is_some_and(|parent| !ids.contains(parent))
        })
        .collect();
    if !orphans.is_empty() {
        tracing::warn!(count = orphans.len(), "activities reference missing projects");
    }
    orphans
}
