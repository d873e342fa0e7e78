//! Taskboard - project roll-up and reporting engine for a task tracker.
//!
//! This library turns a flat task snapshot into a grouped project report:
//! projects bucketed by classification, their activities, scheduling spans,
//! completion percentages, filtering, sorting, selection and bulk updates.
//! The `tb` binary is a thin front end over a JSON snapshot file.

pub mod board;
pub mod cli;
pub mod commands;
pub mod config;
pub mod filter;
pub mod hierarchy;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod progress;
pub mod selection;
pub mod sort;
pub mod stats;
pub mod store;

/// Library-level error type for taskboard operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("{0}")]
    Other(String),
}

impl From<kdl::KdlError> for Error {
    fn from(err: kdl::KdlError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type alias for taskboard operations.
pub type Result<T> = std::result::Result<T, Error>;
