//! Data store boundary and bulk update dispatch.
//!
//! The engine never writes tasks itself: it sends per-task patches through a
//! [`TaskStore`] and reports which requests succeeded. Bulk requests are issued
//! concurrently and every result is collected; failures are not retried and
//! successes are not rolled back.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::metrics::{Clock, SystemClock};
use crate::models::{Profile, Task, TaskPatch, TaskStatus};
use crate::{Error, Result};

/// Remote data store holding tasks and profiles.
#[allow(async_fn_in_trait)]
pub trait TaskStore {
    /// Fetch a full task snapshot.
    async fn fetch_tasks(&self) -> Result<Vec<Task>>;

    /// Fetch profiles, optionally restricted to the given IDs.
    async fn fetch_profiles(&self, ids: Option<&[String]>) -> Result<Vec<Profile>>;

    /// Apply a partial update to one task and return the stored result.
    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task>;
}

/// One failed request of a bulk update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailure {
    pub id: String,
    pub reason: String,
}

/// Settled results of a bulk update, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    /// Returns true if no request failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// IDs of the failed requests, for a targeted retry.
    pub fn failed_ids(&self) -> Vec<String> {
        self.failed.iter().map(|f| f.id.clone()).collect()
    }

    /// Number of requests issued.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Issue one `update_task` per ID concurrently and wait for all to settle.
///
/// Duplicate IDs are sent once.
pub async fn dispatch_bulk<S: TaskStore>(store: &S, ids: &[String], patch: &TaskPatch) -> BulkOutcome {
    let mut seen = HashSet::new();
    let unique: Vec<&String> = ids.iter().filter(|id| seen.insert(id.as_str())).collect();
    tracing::info!(requests = unique.len(), ?patch, "dispatching bulk update");

    let requests = unique.into_iter().map(|id| async move {
        let result = store.update_task(id, patch).await;
        (id, result)
    });
    let settled = join_all(requests).await;

    let mut outcome = BulkOutcome::default();
    for (id, result) in settled {
        match result {
            Ok(_) => outcome.succeeded.push(id.clone()),
            Err(err) => {
                tracing::warn!(id = %id, error = %err, "bulk update request failed");
                outcome.failed.push(BulkFailure {
                    id: id.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    outcome
}

/// Serialized snapshot: tasks plus the profile directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Full(Snapshot),
    TasksOnly(Vec<Task>),
}

impl Snapshot {
    /// Read a snapshot file. A bare task array is accepted too.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot = match serde_json::from_str::<SnapshotFile>(&content) {
            Ok(SnapshotFile::Full(snapshot)) => snapshot,
            Ok(SnapshotFile::TasksOnly(tasks)) => Snapshot {
                tasks,
                profiles: Vec::new(),
            },
            // Re-parse as the full form for a useful error message
            Err(_) => serde_json::from_str::<Snapshot>(&content)?,
        };
        Ok(snapshot)
    }

    /// Write the snapshot as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// In-memory store over a snapshot, optionally backed by a JSON file.
///
/// Completion stamps are taken from the store's clock, the wall clock unless
/// [`SnapshotStore::with_clock`] pins it.
#[derive(Debug)]
pub struct SnapshotStore {
    path: Option<PathBuf>,
    inner: Mutex<Snapshot>,
    clock: Arc<dyn Clock>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

impl SnapshotStore {
    /// Create a store over an in-memory snapshot.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            path: None,
            inner: Mutex::new(snapshot),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for completion stamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Open a snapshot file.
    pub fn open(path: &Path) -> Result<Self> {
        let snapshot = Snapshot::load(path)?;
        tracing::debug!(
            path = %path.display(),
            tasks = snapshot.tasks.len(),
            profiles = snapshot.profiles.len(),
            "loaded snapshot"
        );
        Ok(Self {
            path: Some(path.to_path_buf()),
            ..Self::new(snapshot)
        })
    }

    /// Write the current state back to the file it was opened from.
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| Error::Other("snapshot store has no backing file".to_string()))?;
        self.lock()?.save(path)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>> {
        self.inner
            .lock()
            .map_err(|_| Error::Other("snapshot lock poisoned".to_string()))
    }
}

impl TaskStore for SnapshotStore {
    async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.lock()?.tasks.clone())
    }

    async fn fetch_profiles(&self, ids: Option<&[String]>) -> Result<Vec<Profile>> {
        let snapshot = self.lock()?;
        Ok(match ids {
            Some(ids) => snapshot
                .profiles
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect(),
            None => snapshot.profiles.clone(),
        })
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        if patch.is_empty() {
            return Err(Error::InvalidInput(format!("Empty update for task {}", id)));
        }
        let mut snapshot = self.lock()?;
        let task = snapshot
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Task not found: {}", id)))?;

        patch.apply(task);
        match patch.status {
            Some(TaskStatus::Concluida) => {
                if task.completed_at.is_none() {
                    task.completed_at = Some(self.clock.now());
                }
            }
            // Reopened tasks fall back to their due date or now
            Some(_) => task.completed_at = None,
            None => {}
        }
        tracing::info!(id, "task updated");
        Ok(task.clone())
    }
}
