//! Configuration for taskboard.
//!
//! ## config.kdl - Board preferences
//!
//! Located at `~/.config/taskboard/config.kdl` (platform config dir), or any
//! path passed with `--config`.
//!
//! Contains:
//! - `unclassified-label` - Group name for projects without a classification
//! - `default-sort` / `default-direction` - Initial sort state
//! - `recent-limit` - Length of the recent open task listing (1-100)
//! - `log-level` - Fallback tracing filter
//!
//! ## Precedence
//!
//! CLI flag > environment (log level only) > config file > defaults
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, DEFAULT_LOG_LEVEL, DEFAULT_RECENT_LIMIT, LOG_ENV, Resolved, ResolvedConfig,
    ValueSource, resolve_config, resolve_with,
};
pub use schema::{BoardConfig, KEYS, MAX_RECENT_LIMIT, MIN_RECENT_LIMIT};
