//! Row ordering within a classification group.
//!
//! Every comparator is total, and sorting is stable so tied rows keep their
//! prior relative order in both directions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::board::ProjectRow;

/// Column a group's rows can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Title,
    AssigneeName,
    /// Creation instant
    StartDate,
    BusinessDays,
    CalendarDays,
    /// Resolved endpoint
    EndDate,
    Progress,
    Status,
}

impl SortKey {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::AssigneeName => "assignee_name",
            SortKey::StartDate => "start_date",
            SortKey::BusinessDays => "business_days",
            SortKey::CalendarDays => "calendar_days",
            SortKey::EndDate => "end_date",
            SortKey::Progress => "progress",
            SortKey::Status => "status",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "title" => Ok(SortKey::Title),
            "assignee_name" | "assignee" => Ok(SortKey::AssigneeName),
            "start_date" | "start" => Ok(SortKey::StartDate),
            "business_days" => Ok(SortKey::BusinessDays),
            "calendar_days" => Ok(SortKey::CalendarDays),
            "end_date" | "end" => Ok(SortKey::EndDate),
            "progress" => Ok(SortKey::Progress),
            "status" => Ok(SortKey::Status),
            _ => Err(format!("Unknown sort key: {}", s)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Asc),
            "desc" | "descending" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Current sort key and direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Select `key`: the same key flips direction, a new key resets to ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Asc;
        }
    }
}

/// Lowercase `s` with diacritics stripped, so "Ética" files next to "etica".
fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Accent- and case-insensitive text ordering with a raw-string tiebreak.
pub fn collate(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

/// Compare two rows by `key`, ascending.
pub fn compare(key: SortKey, a: &ProjectRow, b: &ProjectRow) -> Ordering {
    match key {
        SortKey::Title => collate(&a.task.title, &b.task.title),
        SortKey::AssigneeName => collate(
            a.assignee_name.as_deref().unwrap_or(""),
            b.assignee_name.as_deref().unwrap_or(""),
        ),
        SortKey::StartDate => a.metrics.start.cmp(&b.metrics.start),
        SortKey::BusinessDays => a.metrics.business_days.cmp(&b.metrics.business_days),
        SortKey::CalendarDays => a.metrics.calendar_days.cmp(&b.metrics.calendar_days),
        SortKey::EndDate => a.metrics.end.cmp(&b.metrics.end),
        SortKey::Progress => a.metrics.progress_percent.cmp(&b.metrics.progress_percent),
        SortKey::Status => a.task.status.cmp(&b.task.status),
    }
}

/// Stable in-place sort of one group's rows.
pub fn sort_rows(rows: &mut [ProjectRow], state: SortState) {
    match state.direction {
        SortDirection::Asc => rows.sort_by(|a, b| compare(state.key, a, b)),
        SortDirection::Desc => rows.sort_by(|a, b| compare(state.key, b, a)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::RowMetrics;
    use crate::models::{Task, TaskStatus};
    use chrono::{TimeZone, Utc};

    fn row(id: &str, title: &str, business_days: u32, progress: u8) -> ProjectRow {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut task = Task::new(id, title);
        task.is_project = true;
        ProjectRow {
            task,
            assignee_name: None,
            metrics: RowMetrics {
                start,
                end: start,
                business_days,
                calendar_days: business_days,
                progress_percent: progress,
                is_overdue: false,
            },
            activities: Vec::new(),
        }
    }

    fn order(rows: &[ProjectRow]) -> Vec<&str> {
        rows.iter().map(|r| r.task.id.as_str()).collect()
    }

    #[test]
    fn test_toggle_flips_same_key_and_resets_new_key() {
        let mut state = SortState::default();
        assert_eq!(state, SortState::new(SortKey::Title, SortDirection::Asc));

        state.toggle(SortKey::Title);
        assert_eq!(state.direction, SortDirection::Desc);

        state.toggle(SortKey::Progress);
        assert_eq!(state, SortState::new(SortKey::Progress, SortDirection::Asc));

        state.toggle(SortKey::Progress);
        state.toggle(SortKey::Progress);
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn test_collate_ignores_case_first() {
        assert_eq!(collate("alpha", "Beta"), Ordering::Less);
        assert_eq!(collate("Beta", "alpha"), Ordering::Greater);
        assert_eq!(collate("Ops", "ops"), Ordering::Less);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_collate_folds_accents() {
        assert_eq!(collate("Élio", "Zeca"), Ordering::Less);
        assert_eq!(collate("Ética", "Finanças"), Ordering::Less);
        assert_eq!(collate("Álvaro", "Bruno"), Ordering::Less);
        assert_eq!(collate("ação", "acao"), Ordering::Greater);
        assert_eq!(collate("acao", "ação"), Ordering::Less);
    }

    #[test]
    fn test_sort_by_title_with_accents() {
        let mut rows = vec![row("1", "Zeca", 0, 0), row("2", "Bruno", 0, 0), row("3", "Élio", 0, 0)];
        sort_rows(&mut rows, SortState::new(SortKey::Title, SortDirection::Asc));
        assert_eq!(order(&rows), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_sort_by_title() {
        let mut rows = vec![row("1", "charlie", 0, 0), row("2", "Alpha", 0, 0), row("3", "bravo", 0, 0)];
        sort_rows(&mut rows, SortState::new(SortKey::Title, SortDirection::Asc));
        assert_eq!(order(&rows), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut rows = vec![
            row("a", "x", 5, 0),
            row("b", "x", 3, 0),
            row("c", "x", 5, 0),
            row("d", "x", 3, 0),
        ];
        sort_rows(&mut rows, SortState::new(SortKey::BusinessDays, SortDirection::Asc));
        assert_eq!(order(&rows), vec!["b", "d", "a", "c"]);

        sort_rows(&mut rows, SortState::new(SortKey::BusinessDays, SortDirection::Desc));
        assert_eq!(order(&rows), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut rows = vec![row("1", "a", 9, 10), row("2", "b", 1, 90), row("3", "c", 4, 50)];
        let state = SortState::new(SortKey::Progress, SortDirection::Asc);
        sort_rows(&mut rows, state);
        let once = order(&rows).iter().map(|s| s.to_string()).collect::<Vec<_>>();
        sort_rows(&mut rows, state);
        assert_eq!(order(&rows), once);
    }

    #[test]
    fn test_descending_reverses_distinct_rows() {
        let mut rows = vec![row("1", "a", 9, 0), row("2", "b", 1, 0), row("3", "c", 4, 0)];
        sort_rows(&mut rows, SortState::new(SortKey::CalendarDays, SortDirection::Asc));
        let mut asc = order(&rows).iter().map(|s| s.to_string()).collect::<Vec<_>>();
        sort_rows(&mut rows, SortState::new(SortKey::CalendarDays, SortDirection::Desc));
        asc.reverse();
        assert_eq!(order(&rows), asc);
    }

    #[test]
    fn test_sort_by_status_and_assignee() {
        let mut a = row("a", "a", 0, 0);
        a.task.status = TaskStatus::Concluida;
        a.assignee_name = Some("zoe".to_string());
        let mut b = row("b", "b", 0, 0);
        b.task.status = TaskStatus::Pendente;
        b.assignee_name = Some("Ana".to_string());
        let c = row("c", "c", 0, 0);

        let mut rows = vec![a, b, c];
        sort_rows(&mut rows, SortState::new(SortKey::Status, SortDirection::Asc));
        assert_eq!(order(&rows), vec!["b", "c", "a"]);

        // Unassigned rows sort first ascending
        sort_rows(&mut rows, SortState::new(SortKey::AssigneeName, SortDirection::Asc));
        assert_eq!(order(&rows), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("business-days".parse::<SortKey>().unwrap(), SortKey::BusinessDays);
        assert_eq!("assignee".parse::<SortKey>().unwrap(), SortKey::AssigneeName);
        assert_eq!("END_DATE".parse::<SortKey>().unwrap(), SortKey::EndDate);
        assert!("priority".parse::<SortKey>().is_err());
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
    }
}
