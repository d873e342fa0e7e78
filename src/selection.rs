//! Selected-row tracking for bulk actions.
//!
//! The selection may hold IDs of rows that are currently hidden by a filter or
//! a collapsed group. Visible-scoped operations take the visible ID list
//! explicitly and never touch hidden IDs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Set of selected project and activity IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove one ID.
    pub fn toggle(&mut self, id: &str, included: bool) {
        if included {
            self.ids.insert(id.to_string());
        } else {
            self.ids.remove(id);
        }
    }

    /// Union with (`checked`) or subtract (`!checked`) the visible IDs.
    pub fn select_all_visible(&mut self, visible: &[String], checked: bool) {
        for id in visible {
            self.toggle(id, checked);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected IDs that are currently visible.
    pub fn visible_count(&self, visible: &[String]) -> usize {
        visible.iter().filter(|id| self.contains(id)).count()
    }

    /// Selected IDs in sorted order, hidden ones included.
    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
