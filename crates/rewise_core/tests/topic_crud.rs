use rewise_core::db::migrations::latest_version;
use rewise_core::db::open_db_in_memory;
use rewise_core::{RepoError, SqliteTopicRepository, Topic, TopicRepository};
use rusqlite::Connection;
use uuid::Uuid;

fn topic_named(name: &str, due_ms: i64) -> Topic {
    Topic::new(name, "", "", due_ms)
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let mut topic = Topic::new(
        "B-tree internals",
        "page splits and merges",
        "https://example.com/btree",
        1_700_000_000_000,
    );
    topic.stage = 2;
    let id = repo.create_topic(&topic).unwrap();

    let loaded = repo.get_topic(id).unwrap().unwrap();
    assert_eq!(loaded, topic);
}

#[test]
fn get_missing_topic_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    assert!(repo.get_topic(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn update_replaces_the_full_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let mut topic = topic_named("draft", 1_700_000_000_000);
    repo.create_topic(&topic).unwrap();

    topic.name = "Polished title".to_string();
    topic.description = "with notes".to_string();
    topic.stage = 3;
    topic.next_revision_at = 1_700_600_000_000;
    repo.update_topic(&topic).unwrap();

    let loaded = repo.get_topic(topic.uuid).unwrap().unwrap();
    assert_eq!(loaded, topic);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let topic = topic_named("missing", 1_700_000_000_000);
    let err = repo.update_topic(&topic).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == topic.uuid));
}

#[test]
fn list_active_excludes_retired_and_sorts_by_due_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let late = topic_named("late", 3_000);
    let early = topic_named("early", 1_000);
    let retired = topic_named("retired", 2_000);
    repo.create_topic(&late).unwrap();
    repo.create_topic(&early).unwrap();
    repo.create_topic(&retired).unwrap();
    repo.retire_topic(retired.uuid).unwrap();

    let active = repo.list_active().unwrap();
    let names: Vec<_> = active.iter().map(|topic| topic.name.as_str()).collect();
    assert_eq!(names, ["early", "late"]);
}

#[test]
fn list_due_before_applies_inclusive_cutoff() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    repo.create_topic(&topic_named("before", 1_000)).unwrap();
    repo.create_topic(&topic_named("at cutoff", 2_000)).unwrap();
    repo.create_topic(&topic_named("after", 3_000)).unwrap();

    let due = repo.list_due_before(2_000).unwrap();
    let names: Vec<_> = due.iter().map(|topic| topic.name.as_str()).collect();
    assert_eq!(names, ["before", "at cutoff"]);
}

#[test]
fn list_due_before_skips_retired_topics() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let overdue = topic_named("overdue but retired", 1_000);
    repo.create_topic(&overdue).unwrap();
    repo.retire_topic(overdue.uuid).unwrap();

    assert!(repo.list_due_before(5_000).unwrap().is_empty());
}

#[test]
fn list_all_includes_retired_topics() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let active = topic_named("active", 1_000);
    let retired = topic_named("retired", 2_000);
    repo.create_topic(&active).unwrap();
    repo.create_topic(&retired).unwrap();
    repo.retire_topic(retired.uuid).unwrap();

    assert_eq!(repo.list_all().unwrap().len(), 2);
}

#[test]
fn retire_is_idempotent_and_missing_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let topic = topic_named("to retire", 1_000);
    repo.create_topic(&topic).unwrap();

    repo.retire_topic(topic.uuid).unwrap();
    repo.retire_topic(topic.uuid).unwrap();
    assert!(repo.get_topic(topic.uuid).unwrap().unwrap().is_completed);

    let err = repo.retire_topic(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn upsert_replaces_existing_records_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let mut existing = topic_named("original", 1_000);
    repo.create_topic(&existing).unwrap();

    existing.name = "restored".to_string();
    existing.stage = 5;
    let fresh = topic_named("brand new", 2_000);

    let applied = repo
        .upsert_topics(&[existing.clone(), fresh.clone()])
        .unwrap();
    assert_eq!(applied, 2);

    let loaded = repo.get_topic(existing.uuid).unwrap().unwrap();
    assert_eq!(loaded.name, "restored");
    assert_eq!(loaded.stage, 5);
    assert!(repo.get_topic(fresh.uuid).unwrap().is_some());
}

#[test]
fn upsert_with_an_invalid_record_applies_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let valid = topic_named("valid", 1_000);
    let mut invalid = topic_named("placeholder", 2_000);
    invalid.name = String::new();

    let err = repo.upsert_topics(&[valid.clone(), invalid]).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.get_topic(valid.uuid).unwrap().is_none());
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let mut invalid = topic_named("placeholder", 1_000);
    invalid.name = "  ".to_string();

    let create_err = repo.create_topic(&invalid).unwrap_err();
    assert!(matches!(create_err, RepoError::Validation(_)));

    let mut valid = topic_named("fine", 1_000);
    repo.create_topic(&valid).unwrap();
    valid.name = String::new();
    let update_err = repo.update_topic(&valid).unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteTopicRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_topics_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTopicRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("topics"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_topics_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE topics (
            uuid TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            next_revision_at INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTopicRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "topics",
            column: "description"
        })
    ));
}
