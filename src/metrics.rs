//! Date metrics for scheduling figures.
//!
//! Business-day and calendar-day spans between two instants, the resolved
//! endpoint policy for tasks without a completion or due date, and lenient
//! parsing of store timestamps. Calendar days are taken in UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::Task;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Source of the current instant.
pub trait Clock: std::fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Count Monday-Friday calendar days in `[start, end]`, both bounds taken at
/// midnight of their day. Returns 0 when `end < start`.
pub fn business_days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    if end < start {
        return 0;
    }
    let first = start.date_naive();
    let last = end.date_naive();
    let span = (last - first).num_days() + 1;

    // Any 7 consecutive days hold exactly 5 weekdays
    let full_weeks = span / 7;
    let mut count = full_weeks * 5;
    let mut day = first + chrono::Duration::days(full_weeks * 7);
    while day <= last {
        if is_weekday(day) {
            count += 1;
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    count as u32
}

/// Whole days elapsed from `start` to `end`, any partial day rounding up.
/// Never negative.
pub fn calendar_days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let diff = (end - start).num_milliseconds();
    if diff <= 0 {
        return 0;
    }
    let days = diff / MS_PER_DAY + i64::from(diff % MS_PER_DAY != 0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Effective end of a task: completion, else due date, else `now`.
pub fn resolve_endpoint(
    completed_at: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    completed_at.or(due_date).unwrap_or(now)
}

/// Parse a store timestamp, returning `None` for anything unrecognised.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f][+zz]`, naive date-times
/// (read as UTC) and bare dates (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format an optional instant as `dd/mm/yy`, or `-` when absent.
pub fn format_short_date(value: Option<DateTime<Utc>>) -> String {
    match value {
        Some(dt) => dt.format("%d/%m/%y").to_string(),
        None => "-".to_string(),
    }
}

/// Scheduling span of a single task evaluated at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Creation instant, or `now` when missing
    pub start: DateTime<Utc>,
    /// Resolved endpoint
    pub end: DateTime<Utc>,
    pub business_days: u32,
    pub calendar_days: u32,
}

impl Schedule {
    /// Compute the schedule of `task` against `now`.
    pub fn of(task: &Task, now: DateTime<Utc>) -> Self {
        let start = task.created_at.unwrap_or(now);
        let end = resolve_endpoint(task.completed_at, task.due_date, now);
        Self {
            start,
            end,
            business_days: business_days_between(start, end),
            calendar_days: calendar_days_between(start, end),
        }
    }
}
