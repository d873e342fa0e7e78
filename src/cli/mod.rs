//! CLI argument definitions for taskboard.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::filter::Choice;
use crate::models::{Priority, TaskStatus};
use crate::sort::SortKey;

/// Version string with the build commit and timestamp.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TB_GIT_COMMIT"),
    ", built ",
    env!("TB_BUILD_TIMESTAMP"),
    ")"
);

/// Taskboard - project roll-up reports over a task snapshot.
///
/// Start with `tb report` to see projects grouped by classification.
#[derive(Parser, Debug)]
#[command(name = "tb")]
#[command(author, version, long_version = LONG_VERSION)]
#[command(about = "Project roll-up and reporting over a task snapshot", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Snapshot file holding tasks and profiles.
    /// Can also be set via TB_SNAPSHOT environment variable.
    #[arg(short = 's', long = "snapshot", global = true, env = "TB_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Config file (defaults to <config dir>/taskboard/config.kdl)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Evaluate date metrics at this instant instead of the current time
    #[arg(long = "now", global = true, env = "TB_NOW", hide = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show projects grouped by classification (start here!)
    ///
    /// Each project lists its activities, schedule span and progress.
    Report {
        /// Case-insensitive text matched against title, description and assignee name
        #[arg(long)]
        search: Option<String>,

        /// Only projects with this status (pendente, em_progresso, concluida, atrasada, all)
        #[arg(long)]
        status: Option<Choice<TaskStatus>>,

        /// Only projects with this priority (baixa, media, alta, urgente, all)
        #[arg(long)]
        priority: Option<Choice<Priority>>,

        /// Only projects assigned to this profile ID
        #[arg(long)]
        assignee: Option<Choice<String>>,

        /// Sort key (title, assignee_name, start_date, business_days, calendar_days, end_date, progress, status)
        #[arg(long)]
        sort: Option<SortKey>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Collapse a group by name (repeatable)
        #[arg(long = "collapse", value_name = "GROUP")]
        collapse: Vec<String>,
    },

    /// Show task statistics and the most recent open tasks
    Stats {
        /// Number of recent open tasks to list (overrides config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List activities whose project does not exist
    Orphans,

    /// Set the status of one or more tasks
    SetStatus {
        /// New status
        status: TaskStatus,

        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Assign one or more tasks to a profile
    Assign {
        /// Profile ID of the new assignee
        profile_id: String,

        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Convert a task into a project
    Convert {
        /// Task ID
        id: String,
    },

    /// Delegate a task to another profile
    Delegate {
        /// Task ID
        id: String,

        /// Profile ID of the new assignee
        assignee: String,

        /// Profile ID of the delegating user
        #[arg(long = "by")]
        delegator: String,

        /// Reason recorded as a comment
        #[arg(long)]
        note: Option<String>,
    },

    /// Read or change config.kdl settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g. default-sort)
        key: String,
    },

    /// Set a configuration value in the config file
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// List all configuration values and where they come from
    List,
}
