//! Completion percentages for activities, projects and classification groups.
//!
//! All percentages are whole numbers in `0..=100`, rounded half away from zero.

use serde::{Deserialize, Serialize};

use crate::models::Task;

/// Round `100 * numerator / denominator` to the nearest whole percent.
///
/// Returns 0 for an empty denominator.
pub fn round_percent(numerator: usize, denominator: usize) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let numerator = numerator.min(denominator) as u64;
    let denominator = denominator as u64;
    ((200 * numerator + denominator) / (2 * denominator)) as u8
}

/// Progress statistics for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectProgress {
    /// Number of activities
    pub total: usize,
    /// Number of completed activities
    pub completed: usize,
    /// Completion percentage (0-100)
    pub percentage: u8,
}

impl ProjectProgress {
    /// Compute progress for `project` given its activities.
    ///
    /// A project without activities is either done (100) or not (0) based on
    /// its own status.
    pub fn of(project: &Task, activities: &[&Task]) -> Self {
        let total = activities.len();
        let completed = activities.iter().filter(|a| a.is_completed()).count();
        let percentage = if total > 0 {
            round_percent(completed, total)
        } else {
            activity_progress(project)
        };
        Self {
            total,
            completed,
            percentage,
        }
    }
}

/// Binary progress of a single activity.
pub fn activity_progress(task: &Task) -> u8 {
    if task.is_completed() { 100 } else { 0 }
}

/// Mean of member project percentages, rounded. An empty group reports 0.
pub fn group_progress<I>(percentages: I) -> u8
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) = percentages
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), p| (sum + u64::from(p), count + 1));
    if count == 0 {
        return 0;
    }
    ((2 * sum + count) / (2 * count)) as u8
}
