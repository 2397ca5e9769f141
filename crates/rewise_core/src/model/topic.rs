//! Topic domain model.
//!
//! # Responsibility
//! - Define the canonical revision-topic record.
//! - Provide lifecycle helpers for soft retirement.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another topic.
//! - `name` is never empty after trimming.
//! - `is_completed` is the source of truth for retirement; retired topics
//!   stay in storage and keep their history.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a revision topic.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TopicId = Uuid;

/// A subject the user wants to revisit on a spaced-repetition cadence.
///
/// The serde shape of this struct is also the backup record format, so
/// field renames are breaking changes for existing backup files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Stable global ID used for updates, list diffing and restore.
    pub uuid: TopicId,
    /// Display label. Never empty after trimming.
    pub name: String,
    /// Optional free-text notes. Empty string when absent.
    pub description: String,
    /// Optional pointer to study material (URL or free text).
    pub resource_link: String,
    /// Zero-based count of completed revisions; indexes the interval table.
    pub stage: u32,
    /// Unix epoch milliseconds at which the topic becomes due.
    pub next_revision_at: i64,
    /// Retirement flag. Retired topics are excluded from active queries.
    pub is_completed: bool,
}

/// Validation failures for topic records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicValidationError {
    /// `name` is empty or whitespace-only.
    EmptyName,
    /// `uuid` is the nil UUID.
    NilUuid,
}

impl Display for TopicValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "topic name must not be empty"),
            Self::NilUuid => write!(f, "topic uuid must not be nil"),
        }
    }
}

impl Error for TopicValidationError {}

impl Topic {
    /// Creates a new topic at stage 0 with a generated stable ID.
    ///
    /// `first_revision_at` is the epoch-millisecond timestamp of the first
    /// due date; callers schedule it one calendar day after creation.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        resource_link: impl Into<String>,
        first_revision_at: i64,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            resource_link: resource_link.into(),
            stage: 0,
            next_revision_at: first_revision_at,
            is_completed: false,
        }
    }

    /// Creates a topic with a caller-provided stable ID.
    ///
    /// Used by restore paths where identity already exists externally.
    ///
    /// # Errors
    /// - `NilUuid` when the provided ID is the nil UUID.
    pub fn with_id(
        uuid: TopicId,
        name: impl Into<String>,
        description: impl Into<String>,
        resource_link: impl Into<String>,
        first_revision_at: i64,
    ) -> Result<Self, TopicValidationError> {
        if uuid.is_nil() {
            return Err(TopicValidationError::NilUuid);
        }
        Ok(Self {
            uuid,
            name: name.into(),
            description: description.into(),
            resource_link: resource_link.into(),
            stage: 0,
            next_revision_at: first_revision_at,
            is_completed: false,
        })
    }

    /// Checks record-level invariants.
    ///
    /// Repositories call this before every write; restore paths call it on
    /// every decoded record.
    pub fn validate(&self) -> Result<(), TopicValidationError> {
        if self.uuid.is_nil() {
            return Err(TopicValidationError::NilUuid);
        }
        if self.name.trim().is_empty() {
            return Err(TopicValidationError::EmptyName);
        }
        Ok(())
    }

    /// Marks this topic as retired.
    pub fn retire(&mut self) {
        self.is_completed = true;
    }

    /// Clears the retirement flag.
    pub fn reopen(&mut self) {
        self.is_completed = false;
    }

    /// Returns whether this topic participates in active queries.
    pub fn is_active(&self) -> bool {
        !self.is_completed
    }
}
