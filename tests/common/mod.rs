//! Common test utilities for taskboard integration tests.
//!
//! Provides `TestEnv` for isolated test environments: a temporary directory
//! holding a snapshot file and an (empty by default) config file, so tests never
//! read the user's own configuration.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
pub use tempfile::TempDir;

/// Instant every CLI test evaluates date metrics at.
pub const TEST_NOW: &str = "2024-02-01T00:00:00Z";

/// A test environment with an isolated snapshot and config.
///
/// The `tb()` method returns a `Command` with `TB_SNAPSHOT`, `TB_NOW` and
/// `--config` set per invocation, making tests parallel-safe.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    /// Create a new environment with an empty snapshot.
    pub fn new() -> Self {
        let env = Self {
            dir: TempDir::new().unwrap(),
        };
        env.write_snapshot(&serde_json::json!({ "tasks": [], "profiles": [] }));
        env
    }

    /// Create an environment seeded with the standard fixture.
    pub fn with_fixture() -> Self {
        let env = Self::new();
        env.write_snapshot(&fixture());
        env
    }

    /// Get a Command for the tb binary bound to this environment.
    pub fn tb(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tb"));
        cmd.current_dir(self.dir.path());
        cmd.env("TB_SNAPSHOT", self.snapshot_path());
        cmd.env("TB_NOW", TEST_NOW);
        cmd.env_remove("TB_LOG");
        cmd.arg("--config").arg(self.config_path());
        cmd
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.path().join("snapshot.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.kdl")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_snapshot(&self, value: &serde_json::Value) {
        std::fs::write(self.snapshot_path(), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    pub fn write_config(&self, kdl: &str) {
        std::fs::write(self.config_path(), kdl).unwrap();
    }

    /// Read the snapshot back as JSON.
    pub fn read_snapshot(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(self.snapshot_path()).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    /// Find a task in the saved snapshot by ID.
    pub fn task(&self, id: &str) -> serde_json::Value {
        self.read_snapshot()["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["id"] == id)
            .cloned()
            .unwrap_or_else(|| panic!("task {} not in snapshot", id))
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Two Ops projects (P1 with two activities, one done; P2 concluida with none),
/// one Finance project, one unclassified project and one orphaned activity.
pub fn fixture() -> serde_json::Value {
    serde_json::json!({
        "tasks": [
            {
                "id": "P1",
                "title": "Website relaunch",
                "description": "Marketing site",
                "is_project": true,
                "status": "em_progresso",
                "priority": "alta",
                "classification": { "id": "c-ops", "name": "Ops" },
                "assigned_to": "u1",
                "created_at": "2024-01-01T00:00:00Z",
                "due_date": "2024-01-10",
                "comments": ["Kickoff done"]
            },
            {
                "id": "A1",
                "title": "Design mockups",
                "project_id": "P1",
                "status": "concluida",
                "created_at": "2024-01-02T09:00:00Z"
            },
            {
                "id": "A2",
                "title": "Build pages",
                "project_id": "P1",
                "status": "pendente",
                "created_at": "2024-01-03T09:00:00Z"
            },
            {
                "id": "P2",
                "title": "Server audit",
                "is_project": true,
                "status": "concluida",
                "priority": "baixa",
                "classification": { "id": "c-ops", "name": "Ops" },
                "created_at": "2024-01-05T00:00:00Z"
            },
            {
                "id": "F1",
                "title": "Budget review",
                "is_project": true,
                "status": "pendente",
                "priority": "urgente",
                "classification": { "id": "c-fin", "name": "Finance" },
                "assigned_to": "u2",
                "created_at": "2024-01-15T00:00:00Z",
                "due_date": "not a date"
            },
            {
                "id": "X1",
                "title": "Loose ends",
                "is_project": true,
                "created_at": "2024-01-20T00:00:00Z"
            },
            {
                "id": "O1",
                "title": "Lost activity",
                "project_id": "deleted-project",
                "created_at": "2024-01-21T00:00:00Z"
            }
        ],
        "profiles": [
            { "id": "u1", "name": "Ana Souza", "role": "gestao" },
            { "id": "u2", "name": "Bruno Lima", "role": "usuario" }
        ]
    })
}
