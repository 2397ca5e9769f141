//! Due-date classification and list grouping.
//!
//! # Responsibility
//! - Decide due-ness for a single topic against a supplied "now".
//! - Partition an active-topic snapshot into Today/Tomorrow/Upcoming
//!   sections for direct rendering.
//!
//! # Invariants
//! - A topic counts as due today when its due date is before "now" or on
//!   the same calendar day as "now"; overdue topics collapse into Today.
//! - Grouping preserves the relative order of its input; the store hands
//!   topics over pre-sorted ascending by due date.
//! - A header appears only immediately before a non-empty section.

use crate::model::topic::Topic;
use chrono::{DateTime, Datelike, Days, TimeZone};

/// Section label for due and overdue topics.
pub const GROUP_TODAY: &str = "Today";
/// Section label for topics due on the next calendar day.
pub const GROUP_TOMORROW: &str = "Tomorrow";
/// Section label for everything due later.
pub const GROUP_UPCOMING: &str = "Upcoming";

/// One row of the grouped topic list: a section header or a topic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicListItem {
    /// Section header preceding its entries.
    Header(String),
    /// A topic row within the preceding section.
    Entry(Topic),
}

/// Returns whether `a` and `b` fall on the same calendar day.
pub fn is_same_calendar_day<Tz: TimeZone>(a: &DateTime<Tz>, b: &DateTime<Tz>) -> bool {
    a.year() == b.year() && a.ordinal() == b.ordinal()
}

/// Returns whether a topic is due now, overdue, or due later today.
///
/// A topic due at any past instant counts, however distant; so does one
/// due later on the current calendar day. A topic due on the next
/// calendar day does not, even when less than 24 hours away.
pub fn is_due_today<Tz: TimeZone>(topic: &Topic, now: &DateTime<Tz>) -> bool {
    if topic.next_revision_at <= now.timestamp_millis() {
        return true;
    }
    match instant_in_zone(topic.next_revision_at, now) {
        Some(due) => is_same_calendar_day(&due, now),
        // Unrepresentable due instants are strictly in the far future.
        None => false,
    }
}

fn is_due_tomorrow<Tz: TimeZone>(topic: &Topic, now: &DateTime<Tz>) -> bool {
    let Some(due) = instant_in_zone(topic.next_revision_at, now) else {
        return false;
    };
    let Some(tomorrow) = now.clone().checked_add_days(Days::new(1)) else {
        return false;
    };
    is_same_calendar_day(&due, &tomorrow)
}

/// Partitions an active-topic snapshot into headed sections.
///
/// Output is a flat row sequence in Today/Tomorrow/Upcoming order,
/// suitable for direct rendering; empty sections are omitted entirely
/// and empty input yields an empty sequence.
pub fn group_topics<Tz: TimeZone>(topics: Vec<Topic>, now: &DateTime<Tz>) -> Vec<TopicListItem> {
    let mut today = Vec::new();
    let mut tomorrow = Vec::new();
    let mut upcoming = Vec::new();

    for topic in topics {
        if is_due_today(&topic, now) {
            today.push(topic);
        } else if is_due_tomorrow(&topic, now) {
            tomorrow.push(topic);
        } else {
            upcoming.push(topic);
        }
    }

    let mut rows = Vec::new();
    for (title, section) in [
        (GROUP_TODAY, today),
        (GROUP_TOMORROW, tomorrow),
        (GROUP_UPCOMING, upcoming),
    ] {
        if section.is_empty() {
            continue;
        }
        rows.push(TopicListItem::Header(title.to_string()));
        rows.extend(section.into_iter().map(TopicListItem::Entry));
    }
    rows
}

/// Counts topics due today; sizes the reminder notification.
///
/// A zero count means no notification is raised.
pub fn count_due<Tz: TimeZone>(topics: &[Topic], now: &DateTime<Tz>) -> usize {
    topics
        .iter()
        .filter(|topic| is_due_today(topic, now))
        .count()
}

fn instant_in_zone<Tz: TimeZone>(epoch_ms: i64, reference: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    reference.timezone().timestamp_millis_opt(epoch_ms).single()
}
