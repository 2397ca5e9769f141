//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the process-wide database location and the wall clock; the core
//!   itself receives both explicitly.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - "Now" is read from the local clock here and nowhere deeper.

use chrono::Local;
use rewise_core::db::open_db;
use rewise_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, is_due_today,
    ping as ping_inner, read_backup, write_backup, BackupError, RepoError, SqliteTopicRepository,
    Topic, TopicDetails, TopicListItem, TopicService,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const DB_FILE_NAME: &str = "rewise.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope for topic commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Stable ID of the affected topic, when one exists.
    pub topic_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TopicActionResponse {
    fn success(message: impl Into<String>, topic_id: String) -> Self {
        Self {
            ok: true,
            topic_id: Some(topic_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            topic_id: None,
            message: message.into(),
        }
    }
}

/// One topic row of the grouped list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRow {
    /// Stable topic ID in string form.
    pub topic_id: String,
    pub name: String,
    pub description: String,
    pub resource_link: String,
    pub stage: u32,
    /// Due date, unix epoch milliseconds.
    pub next_revision_at: i64,
    /// Whether the revise action should be enabled for this row.
    pub due_today: bool,
}

/// One rendered row: exactly one of `header` or `topic` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedRow {
    /// Section title ("Today"/"Tomorrow"/"Upcoming") for header rows.
    pub header: Option<String>,
    /// Topic payload for entry rows.
    pub topic: Option<TopicRow>,
}

/// Response envelope for the grouped topic list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedTopicsResponse {
    pub rows: Vec<GroupedRow>,
    pub message: String,
}

/// Response envelope for the reminder due count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueCountResponse {
    /// Number of active topics due today; zero means no notification.
    pub count: u32,
    pub message: String,
}

/// Registers a new topic due tomorrow.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns operation result and the created topic ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn topics_add(name: String, description: String, resource_link: String) -> TopicActionResponse {
    let details = TopicDetails {
        name,
        description,
        resource_link,
    };
    match with_topic_service(|service| service.add_topic(&details, &Local::now())) {
        Ok(topic) => TopicActionResponse::success("Topic added.", topic.uuid.to_string()),
        Err(err) => TopicActionResponse::failure(format!("topics_add failed: {err}")),
    }
}

/// Updates a topic's name/description/resource link.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Schedule state is never altered by this call.
#[flutter_rust_bridge::frb(sync)]
pub fn topics_edit(
    topic_id: String,
    name: String,
    description: String,
    resource_link: String,
) -> TopicActionResponse {
    let id = match parse_topic_id(&topic_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let details = TopicDetails {
        name,
        description,
        resource_link,
    };
    match with_topic_service(|service| service.edit_details(id, &details)) {
        Ok(topic) => TopicActionResponse::success("Topic updated.", topic.uuid.to_string()),
        Err(err) => TopicActionResponse::failure(format!("topics_edit failed: {err}")),
    }
}

/// Records a completed revision and reschedules the topic.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn topics_complete_revision(topic_id: String) -> TopicActionResponse {
    let id = match parse_topic_id(&topic_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match with_topic_service(|service| service.complete_revision(id, &Local::now())) {
        Ok(topic) => TopicActionResponse::success("Revision scheduled.", topic.uuid.to_string()),
        Err(err) => TopicActionResponse::failure(format!("topics_complete_revision failed: {err}")),
    }
}

/// Snaps a strictly overdue topic's due date to the present.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; topics that are not overdue are left unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn topics_snap_overdue(topic_id: String) -> TopicActionResponse {
    let id = match parse_topic_id(&topic_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match with_topic_service(|service| service.snap_overdue_to_now(id, &Local::now())) {
        Ok(topic) => TopicActionResponse::success("Topic rescheduled.", topic.uuid.to_string()),
        Err(err) => TopicActionResponse::failure(format!("topics_snap_overdue failed: {err}")),
    }
}

/// Retires a topic from active revision.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; retired topics remain in storage and backups.
#[flutter_rust_bridge::frb(sync)]
pub fn topics_retire(topic_id: String) -> TopicActionResponse {
    let id = match parse_topic_id(&topic_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match with_topic_service(|service| service.retire_topic(id).map(|()| id)) {
        Ok(id) => TopicActionResponse::success("Topic retired.", id.to_string()),
        Err(err) => TopicActionResponse::failure(format!("topics_retire failed: {err}")),
    }
}

/// Returns the grouped Today/Tomorrow/Upcoming rows for rendering.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures return an empty row list with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn topics_grouped() -> GroupedTopicsResponse {
    let now = Local::now();
    match with_topic_service(|service| service.grouped_view(&now)) {
        Ok(items) => {
            let rows = items
                .into_iter()
                .map(|item| match item {
                    TopicListItem::Header(title) => GroupedRow {
                        header: Some(title),
                        topic: None,
                    },
                    TopicListItem::Entry(topic) => GroupedRow {
                        header: None,
                        topic: Some(to_topic_row(topic, &now)),
                    },
                })
                .collect::<Vec<_>>();
            let message = if rows.is_empty() {
                "No topics yet.".to_string()
            } else {
                String::new()
            };
            GroupedTopicsResponse { rows, message }
        }
        Err(err) => GroupedTopicsResponse {
            rows: Vec::new(),
            message: format!("topics_grouped failed: {err}"),
        },
    }
}

/// Counts active topics due today for the reminder notification.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures report count 0 with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn topics_due_count() -> DueCountResponse {
    match with_topic_service(|service| service.due_count(&Local::now())) {
        Ok(count) => DueCountResponse {
            count: count as u32,
            message: String::new(),
        },
        Err(err) => DueCountResponse {
            count: 0,
            message: format!("topics_due_count failed: {err}"),
        },
    }
}

/// Writes every stored topic to a JSON backup file.
///
/// # FFI contract
/// - Sync call, DB- and file-backed execution.
/// - Never panics; an empty store is reported, not written.
#[flutter_rust_bridge::frb(sync)]
pub fn topics_backup(path: String) -> TopicActionResponse {
    let topics = match with_topic_service(|service| service.list_all()) {
        Ok(topics) => topics,
        Err(err) => return TopicActionResponse::failure(format!("topics_backup failed: {err}")),
    };
    match write_backup(&path, &topics) {
        Ok(()) => TopicActionResponse {
            ok: true,
            topic_id: None,
            message: format!("Backup saved ({} topics).", topics.len()),
        },
        Err(BackupError::EmptyBackup) => TopicActionResponse::failure("No data to backup."),
        Err(err) => TopicActionResponse::failure(format!("topics_backup failed: {err}")),
    }
}

/// Restores topics from a JSON backup file, replacing records by ID.
///
/// # FFI contract
/// - Sync call, DB- and file-backed execution.
/// - Never panics; empty or malformed backups are rejected whole.
#[flutter_rust_bridge::frb(sync)]
pub fn topics_restore(path: String) -> TopicActionResponse {
    let topics = match read_backup(&path) {
        Ok(topics) => topics,
        Err(err) => return TopicActionResponse::failure(format!("topics_restore failed: {err}")),
    };
    match with_topic_service(|service| service.restore_topics(&topics)) {
        Ok(count) => TopicActionResponse {
            ok: true,
            topic_id: None,
            message: format!("Restored {count} topics."),
        },
        Err(err) => TopicActionResponse::failure(format!("topics_restore failed: {err}")),
    }
}

fn to_topic_row(topic: Topic, now: &chrono::DateTime<Local>) -> TopicRow {
    let due_today = is_due_today(&topic, now);
    TopicRow {
        topic_id: topic.uuid.to_string(),
        name: topic.name,
        description: topic.description,
        resource_link: topic.resource_link,
        stage: topic.stage,
        next_revision_at: topic.next_revision_at,
        due_today,
    }
}

fn parse_topic_id(raw: &str) -> Result<Uuid, TopicActionResponse> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| TopicActionResponse::failure(format!("invalid topic id `{raw}`")))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("REWISE_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_topic_service<T>(
    f: impl FnOnce(&TopicService<SqliteTopicRepository<'_>>) -> Result<T, RepoError>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let repo =
        SqliteTopicRepository::try_new(&conn).map_err(|err| format!("repo init failed: {err}"))?;
    let service = TopicService::new(repo);
    f(&service).map_err(|err| err.to_string())
}
