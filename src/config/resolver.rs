//! Precedence resolution for board configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. `TB_LOG` environment variable (log level only)
//! 3. config.kdl (`--config` path, or the default location)
//! 4. Built-in defaults

use std::path::Path;

use crate::Result;
use crate::config::BoardConfig;
use crate::hierarchy::DEFAULT_UNCLASSIFIED_LABEL;
use crate::sort::{SortDirection, SortKey, SortState};

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "TB_LOG";

/// Built-in length of the recent-open-task listing.
pub const DEFAULT_RECENT_LIMIT: u32 = 5;

/// Built-in tracing filter.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from a config file
    ConfigFile(String),
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile(path) => write!(f, "file:{}", path),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub unclassified_label: Resolved<String>,
    pub sort_key: Resolved<SortKey>,
    pub sort_direction: Resolved<SortDirection>,
    pub recent_limit: Resolved<u32>,
    pub log_level: Resolved<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            unclassified_label: Resolved::new(
                DEFAULT_UNCLASSIFIED_LABEL.to_string(),
                ValueSource::Default,
            ),
            sort_key: Resolved::new(SortKey::default(), ValueSource::Default),
            sort_direction: Resolved::new(SortDirection::default(), ValueSource::Default),
            recent_limit: Resolved::new(DEFAULT_RECENT_LIMIT, ValueSource::Default),
            log_level: Resolved::new(DEFAULT_LOG_LEVEL.to_string(), ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    pub fn unclassified_label(&self) -> &str {
        &self.unclassified_label.value
    }

    /// Initial sort state for a new board.
    pub fn sort_state(&self) -> SortState {
        SortState::new(self.sort_key.value, self.sort_direction.value)
    }

    pub fn recent_limit(&self) -> usize {
        self.recent_limit.value as usize
    }

    pub fn log_level(&self) -> &str {
        &self.log_level.value
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Sort key override from CLI flag
    pub sort_key: Option<SortKey>,
    /// Sort direction override from CLI flag
    pub sort_direction: Option<SortDirection>,
    /// Log filter from the environment
    pub log_env: Option<String>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set sort key override.
    pub fn with_sort_key(mut self, key: SortKey) -> Self {
        self.sort_key = Some(key);
        self
    }

    /// Set sort direction override.
    pub fn with_sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = Some(direction);
        self
    }

    /// Capture `TB_LOG` from the process environment, ignoring blank values.
    pub fn with_log_env(mut self) -> Self {
        self.log_env = std::env::var(LOG_ENV).ok().filter(|v| !v.trim().is_empty());
        self
    }
}

/// Resolve configuration from an already-loaded file.
///
/// `origin` names the file for source tracking.
pub fn resolve_with(file: &BoardConfig, origin: &str, overrides: &ConfigOverrides) -> ResolvedConfig {
    let mut result = ResolvedConfig::default();
    let from_file = || ValueSource::ConfigFile(origin.to_string());

    if let Some(ref label) = file.unclassified_label {
        result.unclassified_label = Resolved::new(label.clone(), from_file());
    }

    if let Some(key) = overrides.sort_key {
        result.sort_key = Resolved::new(key, ValueSource::CliFlag);
    } else if let Some(key) = file.default_sort {
        result.sort_key = Resolved::new(key, from_file());
    }

    if let Some(direction) = overrides.sort_direction {
        result.sort_direction = Resolved::new(direction, ValueSource::CliFlag);
    } else if let Some(direction) = file.default_direction {
        result.sort_direction = Resolved::new(direction, from_file());
    }

    if let Some(limit) = file.recent_limit {
        result.recent_limit = Resolved::new(limit, from_file());
    }

    if let Some(ref level) = overrides.log_env {
        result.log_level = Resolved::new(level.clone(), ValueSource::EnvVar(LOG_ENV.to_string()));
    } else if let Some(ref level) = file.log_level {
        result.log_level = Resolved::new(level.clone(), from_file());
    }

    result
}

/// Load config from `path` (or the default location) and resolve it.
///
/// A missing file falls back to defaults; a malformed or invalid one is an error.
pub fn resolve_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => BoardConfig::default_path(),
    };
    let Some(path) = path else {
        return Ok(resolve_with(&BoardConfig::default(), "", overrides));
    };
    let file = BoardConfig::load(&path)?;
    Ok(resolve_with(&file, &path.display().to_string(), overrides))
}
