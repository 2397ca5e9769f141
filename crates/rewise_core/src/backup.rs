//! JSON backup and restore of the full topic collection.
//!
//! # Responsibility
//! - Serialize every stored topic to a flat JSON record list.
//! - Decode and validate record lists coming back from user-picked files.
//!
//! # Invariants
//! - The record shape is the serde form of `Topic`; nothing else is
//!   written.
//! - Restore rejects empty or invalid record lists instead of silently
//!   applying nothing.
//! - Each backup or restore is a single atomic unit; there is no retry
//!   or partial-failure handling.

use crate::model::topic::{Topic, TopicValidationError};
use crate::repo::topic_repo::{RepoResult, TopicRepository};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Default backup file name offered to callers.
pub const BACKUP_FILE_NAME: &str = "rewise_topics.json";

/// Failure modes for backup serialization and file handling.
#[derive(Debug)]
pub enum BackupError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The backup contains no records; writing or restoring it is refused.
    EmptyBackup,
    /// A decoded record violates topic invariants.
    Validation(TopicValidationError),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::EmptyBackup => write!(f, "backup is empty or invalid"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::EmptyBackup => None,
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BackupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<TopicValidationError> for BackupError {
    fn from(value: TopicValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Serializes topics to the backup JSON document.
///
/// # Errors
/// - `EmptyBackup` when there is nothing to back up.
pub fn serialize_topics(topics: &[Topic]) -> Result<String, BackupError> {
    if topics.is_empty() {
        return Err(BackupError::EmptyBackup);
    }
    Ok(serde_json::to_string_pretty(topics)?)
}

/// Decodes and validates a backup JSON document.
///
/// # Errors
/// - `Json` when the document is not a topic record list.
/// - `EmptyBackup` when the list holds no records.
/// - `Validation` when any record violates topic invariants.
pub fn deserialize_topics(json: &str) -> Result<Vec<Topic>, BackupError> {
    let topics: Vec<Topic> = serde_json::from_str(json)?;
    if topics.is_empty() {
        return Err(BackupError::EmptyBackup);
    }
    for topic in &topics {
        topic.validate()?;
    }
    Ok(topics)
}

/// Writes the backup document to `path`.
///
/// # Side effects
/// - Emits `backup_write` logging events with record count and status.
pub fn write_backup(path: impl AsRef<Path>, topics: &[Topic]) -> Result<(), BackupError> {
    let path = path.as_ref();
    match serialize_topics(topics).and_then(|json| Ok(std::fs::write(path, json)?)) {
        Ok(()) => {
            info!(
                "event=backup_write module=backup status=ok records={} path={}",
                topics.len(),
                path.display()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=backup_write module=backup status=error path={} error={err}",
                path.display()
            );
            Err(err)
        }
    }
}

/// Reads and decodes a backup document from `path`.
///
/// # Side effects
/// - Emits `backup_read` logging events with record count and status.
pub fn read_backup(path: impl AsRef<Path>) -> Result<Vec<Topic>, BackupError> {
    let path = path.as_ref();
    let decoded = std::fs::read_to_string(path)
        .map_err(BackupError::from)
        .and_then(|json| deserialize_topics(&json));
    match &decoded {
        Ok(topics) => info!(
            "event=backup_read module=backup status=ok records={} path={}",
            topics.len(),
            path.display()
        ),
        Err(err) => error!(
            "event=backup_read module=backup status=error path={} error={err}",
            path.display()
        ),
    }
    decoded
}

/// Applies restored records to the store, replacing by stable ID.
pub fn restore_into<R: TopicRepository>(repo: &R, topics: &[Topic]) -> RepoResult<usize> {
    repo.upsert_topics(topics)
}
