//! Topic use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for the add/edit/revise/retire flows.
//! - Thread the caller-supplied clock into scheduling and grouping.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.
//! - Completing a revision is the only path that advances a topic's stage.

use crate::grouping::{count_due, group_topics, TopicListItem};
use crate::model::topic::{Topic, TopicId};
use crate::repo::topic_repo::{RepoError, RepoResult, TopicRepository};
use crate::scheduler::{first_revision_at, reschedule_overdue_to_now, schedule_next};
use chrono::{DateTime, TimeZone};

/// User-editable fields of a topic, shared by the add and edit flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDetails {
    /// Display label; must be non-empty after trimming.
    pub name: String,
    /// Free-text notes, may be empty.
    pub description: String,
    /// Study-material pointer, may be empty.
    pub resource_link: String,
}

/// Use-case service wrapper over a topic repository.
pub struct TopicService<R: TopicRepository> {
    repo: R,
}

impl<R: TopicRepository> TopicService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new topic at stage 0, first revision one calendar day
    /// after `now`.
    ///
    /// Inputs are trimmed; an empty name is rejected by validation.
    pub fn add_topic<Tz: TimeZone>(
        &self,
        details: &TopicDetails,
        now: &DateTime<Tz>,
    ) -> RepoResult<Topic> {
        let topic = Topic::new(
            details.name.trim(),
            details.description.trim(),
            details.resource_link.trim(),
            first_revision_at(now),
        );
        self.repo.create_topic(&topic)?;
        Ok(topic)
    }

    /// Replaces a topic's name/description/resource link.
    ///
    /// Schedule state (stage, due date, retirement) is untouched.
    pub fn edit_details(&self, id: TopicId, details: &TopicDetails) -> RepoResult<Topic> {
        let mut topic = self.require_topic(id)?;
        topic.name = details.name.trim().to_string();
        topic.description = details.description.trim().to_string();
        topic.resource_link = details.resource_link.trim().to_string();
        self.repo.update_topic(&topic)?;
        Ok(topic)
    }

    /// Records a completed revision: advances the stage and pushes the due
    /// date out by the current stage's interval.
    pub fn complete_revision<Tz: TimeZone>(
        &self,
        id: TopicId,
        now: &DateTime<Tz>,
    ) -> RepoResult<Topic> {
        let mut topic = self.require_topic(id)?;
        let outcome = schedule_next(topic.stage, now);
        topic.stage = outcome.next_stage;
        topic.next_revision_at = outcome.next_revision_at;
        self.repo.update_topic(&topic)?;
        Ok(topic)
    }

    /// Moves a strictly overdue topic's due date up to `now`.
    ///
    /// Topics that are not overdue (including due-later-today ones) are
    /// returned unchanged.
    pub fn snap_overdue_to_now<Tz: TimeZone>(
        &self,
        id: TopicId,
        now: &DateTime<Tz>,
    ) -> RepoResult<Topic> {
        let mut topic = self.require_topic(id)?;
        if topic.next_revision_at < now.timestamp_millis() {
            topic.next_revision_at = reschedule_overdue_to_now(now);
            self.repo.update_topic(&topic)?;
        }
        Ok(topic)
    }

    /// Retires a topic; it disappears from active listings but stays in
    /// storage and in backups.
    pub fn retire_topic(&self, id: TopicId) -> RepoResult<()> {
        self.repo.retire_topic(id)
    }

    /// Gets one topic by stable ID.
    pub fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        self.repo.get_topic(id)
    }

    /// Lists the active snapshot, ascending by due date.
    pub fn list_active(&self) -> RepoResult<Vec<Topic>> {
        self.repo.list_active()
    }

    /// Lists every stored topic, retired included; the backup export
    /// source.
    pub fn list_all(&self) -> RepoResult<Vec<Topic>> {
        self.repo.list_all()
    }

    /// Applies restored backup records, replacing stored topics by ID.
    pub fn restore_topics(&self, topics: &[Topic]) -> RepoResult<usize> {
        self.repo.upsert_topics(topics)
    }

    /// Returns the headed Today/Tomorrow/Upcoming rows for rendering.
    pub fn grouped_view<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> RepoResult<Vec<TopicListItem>> {
        Ok(group_topics(self.repo.list_active()?, now))
    }

    /// Counts active topics due today; the reminder job raises a
    /// notification only when this is positive.
    pub fn due_count<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> RepoResult<usize> {
        Ok(count_due(&self.repo.list_active()?, now))
    }

    fn require_topic(&self, id: TopicId) -> RepoResult<Topic> {
        self.repo.get_topic(id)?.ok_or(RepoError::NotFound(id))
    }
}
