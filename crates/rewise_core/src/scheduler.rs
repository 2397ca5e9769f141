//! Spaced-repetition scheduling.
//!
//! # Responsibility
//! - Map a topic's current stage to its next due timestamp and next stage.
//! - Keep the interval progression a process-wide constant.
//!
//! # Invariants
//! - `schedule_next` is total for every `u32` stage; past the end of the
//!   interval table the day interval plateaus at the last entry.
//! - The stage counter itself grows without bound.
//! - Scheduling is pure: "now" is always an explicit caller-supplied
//!   timestamp, never an ambient clock read.

use chrono::{DateTime, Days, TimeZone};

/// Days between revisions, indexed by stage.
///
/// Classic spaced-repetition progression; completing stage `n` schedules
/// the next revision `REVISION_INTERVALS_DAYS[n]` days out.
pub const REVISION_INTERVALS_DAYS: [u64; 9] = [1, 3, 7, 14, 30, 60, 90, 180, 365];

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Result of completing one revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOutcome {
    /// Next due date, unix epoch milliseconds.
    pub next_revision_at: i64,
    /// Stage the topic moves to.
    pub next_stage: u32,
}

/// Returns the revision gap in days for a stage.
///
/// Stages beyond the interval table use the last (largest) entry.
pub fn interval_days(stage: u32) -> u64 {
    let last = REVISION_INTERVALS_DAYS[REVISION_INTERVALS_DAYS.len() - 1];
    REVISION_INTERVALS_DAYS
        .get(stage as usize)
        .copied()
        .unwrap_or(last)
}

/// Computes the next due date and stage after a completed revision.
///
/// The due date advances by whole calendar days in `now`'s timezone, so
/// the wall-clock time of day is preserved and month/year/leap boundaries
/// roll correctly.
pub fn schedule_next<Tz: TimeZone>(current_stage: u32, now: &DateTime<Tz>) -> ScheduleOutcome {
    ScheduleOutcome {
        next_revision_at: add_calendar_days(now, interval_days(current_stage)),
        // Saturates at u32::MAX; the interval plateaued long before that.
        next_stage: current_stage.saturating_add(1),
    }
}

/// Returns the first due date for a freshly created topic: one calendar
/// day after creation.
pub fn first_revision_at<Tz: TimeZone>(created_at: &DateTime<Tz>) -> i64 {
    add_calendar_days(created_at, 1)
}

/// Snaps an overdue topic's due date to the present.
///
/// Pass-through by design: callers decide whether a topic qualifies.
pub fn reschedule_overdue_to_now<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    now.timestamp_millis()
}

/// Advances `from` by `days` calendar days and returns epoch milliseconds.
///
/// Falls back to fixed 24-hour days only when the calendar result is not
/// representable (far-future dates, skipped local times).
pub(crate) fn add_calendar_days<Tz: TimeZone>(from: &DateTime<Tz>, days: u64) -> i64 {
    from.clone()
        .checked_add_days(Days::new(days))
        .map(|due| due.timestamp_millis())
        .unwrap_or_else(|| {
            from.timestamp_millis()
                .saturating_add((days as i64).saturating_mul(MS_PER_DAY))
        })
}
