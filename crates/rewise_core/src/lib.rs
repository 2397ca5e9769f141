//! Core domain logic for Rewise, a spaced-repetition revision reminder.
//! This crate is the single source of truth for scheduling invariants.

pub mod backup;
pub mod db;
pub mod grouping;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scheduler;
pub mod service;

pub use backup::{
    deserialize_topics, read_backup, restore_into, serialize_topics, write_backup, BackupError,
    BACKUP_FILE_NAME,
};
pub use grouping::{
    count_due, group_topics, is_due_today, is_same_calendar_day, TopicListItem, GROUP_TODAY,
    GROUP_TOMORROW, GROUP_UPCOMING,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::topic::{Topic, TopicId, TopicValidationError};
pub use repo::topic_repo::{RepoError, RepoResult, SqliteTopicRepository, TopicRepository};
pub use scheduler::{
    interval_days, reschedule_overdue_to_now, schedule_next, ScheduleOutcome,
    REVISION_INTERVALS_DAYS,
};
pub use service::topic_service::{TopicDetails, TopicService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
