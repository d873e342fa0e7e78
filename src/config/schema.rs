//! KDL schema definitions for config.kdl.
//!
//! This module provides:
//! - The [`BoardConfig`] struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation and merging

use std::path::{Path, PathBuf};

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

use crate::sort::{SortDirection, SortKey};
use crate::{Error, Result};

/// Smallest accepted `recent-limit`.
pub const MIN_RECENT_LIMIT: u32 = 1;
/// Largest accepted `recent-limit`.
pub const MAX_RECENT_LIMIT: u32 = 100;

/// Settable config keys, in listing order.
pub const KEYS: &[&str] = &[
    "unclassified-label",
    "default-sort",
    "default-direction",
    "recent-limit",
    "log-level",
];

fn recent_limit_error(got: impl std::fmt::Display) -> String {
    format!(
        "recent-limit must be {}-{}, got {}",
        MIN_RECENT_LIMIT, MAX_RECENT_LIMIT, got
    )
}

/// Board preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// unclassified-label "Sem classificação"
/// default-sort "business_days"
/// default-direction "desc"
/// recent-limit 5
/// log-level "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Bucket name for projects without a classification
    pub unclassified_label: Option<String>,

    /// Initial sort key
    pub default_sort: Option<SortKey>,

    /// Initial sort direction
    pub default_direction: Option<SortDirection>,

    /// Number of open tasks listed by `tb stats`
    pub recent_limit: Option<u32>,

    /// Fallback tracing filter directive
    pub log_level: Option<String>,
}

fn first_string<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a str> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .and_then(|entry| entry.value().as_string())
}

fn string_node(name: &str, value: &str) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    node
}

impl BoardConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location: `<config dir>/taskboard/config.kdl`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("taskboard").join("config.kdl"))
    }

    /// Read and validate a config file. A missing file yields an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let doc: KdlDocument = content.parse()?;
        let config = Self::from_kdl(&doc)
            .and_then(|config| config.validate().map(|()| config))
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Write the config as KDL, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_kdl().to_string())?;
        Ok(())
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(limit) = self.recent_limit
            && !(MIN_RECENT_LIMIT..=MAX_RECENT_LIMIT).contains(&limit)
        {
            return Err(recent_limit_error(limit));
        }
        if let Some(ref label) = self.unclassified_label
            && label.trim().is_empty()
        {
            return Err("unclassified-label must not be blank".to_string());
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes are ignored and unparseable sort values are dropped. A
    /// `recent-limit` that does not fit a `u32` is an error; other out-of-range
    /// limits are kept for [`BoardConfig::validate`] to report.
    pub fn from_kdl(doc: &KdlDocument) -> std::result::Result<Self, String> {
        let mut config = Self::new();

        config.unclassified_label = first_string(doc, "unclassified-label").map(str::to_string);
        config.default_sort = first_string(doc, "default-sort").and_then(|s| s.parse().ok());
        config.default_direction = first_string(doc, "default-direction").and_then(SortDirection::parse);
        config.log_level = first_string(doc, "log-level").map(str::to_string);

        if let Some(node) = doc.get("recent-limit")
            && let Some(entry) = node.entries().first()
            && let Some(i) = entry.value().as_integer()
        {
            config.recent_limit = Some(u32::try_from(i).map_err(|_| recent_limit_error(i))?);
        }

        Ok(config)
    }

    /// Config holding just `key` set to `value`, for merging into a file.
    pub fn from_setting(key: &str, value: &str) -> Result<Self> {
        let mut config = Self::new();
        match key {
            "unclassified-label" => config.unclassified_label = Some(value.to_string()),
            "default-sort" => config.default_sort = Some(value.parse().map_err(Error::Config)?),
            "default-direction" => {
                config.default_direction = Some(
                    SortDirection::parse(value)
                        .ok_or_else(|| Error::Config(format!("Unknown sort direction: {}", value)))?,
                )
            }
            "recent-limit" => {
                config.recent_limit = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| Error::Config(recent_limit_error(value)))?,
                )
            }
            "log-level" => config.log_level = Some(value.to_string()),
            _ => {
                return Err(Error::Config(format!(
                    "Unknown config key: {} (expected one of: {})",
                    key,
                    KEYS.join(", ")
                )));
            }
        }
        Ok(config)
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref label) = self.unclassified_label {
            doc.nodes_mut().push(string_node("unclassified-label", label));
        }
        if let Some(key) = self.default_sort {
            doc.nodes_mut().push(string_node("default-sort", key.as_str()));
        }
        if let Some(direction) = self.default_direction {
            doc.nodes_mut().push(string_node("default-direction", direction.as_str()));
        }
        if let Some(limit) = self.recent_limit {
            let mut node = KdlNode::new("recent-limit");
            node.push(KdlEntry::new(KdlValue::Integer(i128::from(limit))));
            doc.nodes_mut().push(node);
        }
        if let Some(ref level) = self.log_level {
            doc.nodes_mut().push(string_node("log-level", level));
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &BoardConfig) {
        if other.unclassified_label.is_some() {
            self.unclassified_label = other.unclassified_label.clone();
        }
        if other.default_sort.is_some() {
            self.default_sort = other.default_sort;
        }
        if other.default_direction.is_some() {
            self.default_direction = other.default_direction;
        }
        if other.recent_limit.is_some() {
            self.recent_limit = other.recent_limit;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level.clone();
        }
    }
}
