//! Topic repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and due-query APIs over canonical `topics`
//!   storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Topic::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Active listings are ordered ascending by due date; grouping relies
//!   on that order and never re-sorts.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::topic::{Topic, TopicId, TopicValidationError};
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TOPIC_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    resource_link,
    stage,
    next_revision_at,
    is_completed
FROM topics";

const REQUIRED_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "description",
    "resource_link",
    "stage",
    "next_revision_at",
    "is_completed",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for topic persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TopicValidationError),
    Db(DbError),
    NotFound(TopicId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "topic not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted topic data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not initialized via open_db: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TopicValidationError> for RepoError {
    fn from(value: TopicValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the topic store.
///
/// This is the contract the scheduling core's callers program against:
/// create/update/read plus the active and due-before listings consumed by
/// the UI snapshot, reminder job and backup job.
pub trait TopicRepository {
    fn create_topic(&self, topic: &Topic) -> RepoResult<TopicId>;
    fn update_topic(&self, topic: &Topic) -> RepoResult<()>;
    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>>;
    /// Non-retired topics, ascending by due date.
    fn list_active(&self) -> RepoResult<Vec<Topic>>;
    /// Non-retired topics with a due date at or before `cutoff_ms`.
    fn list_due_before(&self, cutoff_ms: i64) -> RepoResult<Vec<Topic>>;
    /// Every stored topic, retired included; the backup export source.
    fn list_all(&self) -> RepoResult<Vec<Topic>>;
    /// Inserts or wholesale-replaces records by id; the restore path.
    fn upsert_topics(&self, topics: &[Topic]) -> RepoResult<usize>;
    fn retire_topic(&self, id: TopicId) -> RepoResult<()>;
}

/// SQLite-backed topic repository.
pub struct SqliteTopicRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTopicRepository<'conn> {
    /// Wraps a connection after verifying it was initialized via `open_db`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match
    ///   this binary's latest migration.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   claims the right version but lacks required storage.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let table_exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'topics'
            );",
            [],
            |row| row.get(0),
        )?;
        if table_exists == 0 {
            return Err(RepoError::MissingRequiredTable("topics"));
        }

        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('topics');")?;
        let mut rows = stmt.query([])?;
        let mut present = HashSet::new();
        while let Some(row) = rows.next()? {
            present.insert(row.get::<_, String>(0)?);
        }
        for &column in REQUIRED_COLUMNS {
            if !present.contains(column) {
                return Err(RepoError::MissingRequiredColumn {
                    table: "topics",
                    column,
                });
            }
        }

        Ok(Self { conn })
    }
}

impl TopicRepository for SqliteTopicRepository<'_> {
    fn create_topic(&self, topic: &Topic) -> RepoResult<TopicId> {
        topic.validate()?;

        self.conn.execute(
            "INSERT INTO topics (
                uuid,
                name,
                description,
                resource_link,
                stage,
                next_revision_at,
                is_completed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                topic.uuid.to_string(),
                topic.name.as_str(),
                topic.description.as_str(),
                topic.resource_link.as_str(),
                i64::from(topic.stage),
                topic.next_revision_at,
                bool_to_int(topic.is_completed),
            ],
        )?;

        Ok(topic.uuid)
    }

    fn update_topic(&self, topic: &Topic) -> RepoResult<()> {
        topic.validate()?;

        let changed = self.conn.execute(
            "UPDATE topics
             SET
                name = ?1,
                description = ?2,
                resource_link = ?3,
                stage = ?4,
                next_revision_at = ?5,
                is_completed = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?7;",
            params![
                topic.name.as_str(),
                topic.description.as_str(),
                topic.resource_link.as_str(),
                i64::from(topic.stage),
                topic.next_revision_at,
                bool_to_int(topic.is_completed),
                topic.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(topic.uuid));
        }

        Ok(())
    }

    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TOPIC_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_topic_row(row)?));
        }

        Ok(None)
    }

    fn list_active(&self) -> RepoResult<Vec<Topic>> {
        self.query_topics(&format!(
            "{TOPIC_SELECT_SQL}
             WHERE is_completed = 0
             ORDER BY next_revision_at ASC, uuid ASC;"
        ))
    }

    fn list_due_before(&self, cutoff_ms: i64) -> RepoResult<Vec<Topic>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TOPIC_SELECT_SQL}
             WHERE is_completed = 0 AND next_revision_at <= ?1
             ORDER BY next_revision_at ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([cutoff_ms])?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(parse_topic_row(row)?);
        }
        Ok(topics)
    }

    fn list_all(&self) -> RepoResult<Vec<Topic>> {
        self.query_topics(&format!(
            "{TOPIC_SELECT_SQL}
             ORDER BY next_revision_at ASC, uuid ASC;"
        ))
    }

    fn upsert_topics(&self, topics: &[Topic]) -> RepoResult<usize> {
        for topic in topics {
            topic.validate()?;
        }

        // All-or-nothing: a partially-invalid restore batch applies nothing.
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO topics (
                    uuid,
                    name,
                    description,
                    resource_link,
                    stage,
                    next_revision_at,
                    is_completed
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            )?;
            for topic in topics {
                stmt.execute(params![
                    topic.uuid.to_string(),
                    topic.name.as_str(),
                    topic.description.as_str(),
                    topic.resource_link.as_str(),
                    i64::from(topic.stage),
                    topic.next_revision_at,
                    bool_to_int(topic.is_completed),
                ])?;
            }
        }
        tx.commit()?;

        Ok(topics.len())
    }

    fn retire_topic(&self, id: TopicId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics
             SET
                is_completed = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

impl SqliteTopicRepository<'_> {
    fn query_topics(&self, sql: &str) -> RepoResult<Vec<Topic>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(parse_topic_row(row)?);
        }
        Ok(topics)
    }
}

fn parse_topic_row(row: &Row<'_>) -> RepoResult<Topic> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in topics.uuid"))
    })?;

    let raw_stage: i64 = row.get("stage")?;
    let stage = u32::try_from(raw_stage).map_err(|_| {
        RepoError::InvalidData(format!("invalid stage value `{raw_stage}` in topics.stage"))
    })?;

    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in topics.is_completed"
            )));
        }
    };

    let topic = Topic {
        uuid,
        name: row.get("name")?,
        description: row.get("description")?,
        resource_link: row.get("resource_link")?,
        stage,
        next_revision_at: row.get("next_revision_at")?,
        is_completed,
    };
    topic.validate()?;
    Ok(topic)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
