use rewise_core::db::open_db_in_memory;
use rewise_core::{
    deserialize_topics, read_backup, restore_into, serialize_topics, write_backup, BackupError,
    SqliteTopicRepository, Topic, TopicRepository,
};

fn sample_topics() -> Vec<Topic> {
    let mut kept = Topic::new(
        "Skip lists",
        "probabilistic balancing",
        "https://example.com/skiplist",
        1_700_000_000_000,
    );
    kept.stage = 3;
    let mut retired = Topic::new("Morse code", "", "", 1_690_000_000_000);
    retired.retire();
    vec![kept, retired]
}

#[test]
fn serialize_then_deserialize_preserves_every_field() {
    let topics = sample_topics();

    let json = serialize_topics(&topics).unwrap();
    let decoded = deserialize_topics(&json).unwrap();

    assert_eq!(decoded, topics);
}

#[test]
fn serialize_refuses_an_empty_collection() {
    let err = serialize_topics(&[]).unwrap_err();
    assert!(matches!(err, BackupError::EmptyBackup));
}

#[test]
fn deserialize_rejects_an_empty_record_list() {
    let err = deserialize_topics("[]").unwrap_err();
    assert!(matches!(err, BackupError::EmptyBackup));
}

#[test]
fn deserialize_rejects_malformed_documents() {
    let err = deserialize_topics("this is not json").unwrap_err();
    assert!(matches!(err, BackupError::Json(_)));
}

#[test]
fn deserialize_rejects_records_with_blank_names() {
    let mut topics = sample_topics();
    topics[0].name = "  ".to_string();
    let json = serde_json::to_string(&topics).unwrap();

    let err = deserialize_topics(&json).unwrap_err();
    assert!(matches!(err, BackupError::Validation(_)));
}

#[test]
fn file_backup_roundtrip_restores_the_same_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rewise_topics.json");
    let topics = sample_topics();

    write_backup(&path, &topics).unwrap();
    let restored = read_backup(&path).unwrap();

    assert_eq!(restored, topics);
}

#[test]
fn read_backup_reports_missing_files_as_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_backup(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, BackupError::Io(_)));
}

#[test]
fn restore_into_replaces_matching_ids_and_inserts_the_rest() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let mut topics = sample_topics();
    repo.create_topic(&topics[0]).unwrap();

    topics[0].name = "Skip lists, revisited".to_string();
    let applied = restore_into(&repo, &topics).unwrap();
    assert_eq!(applied, 2);

    let loaded = repo.get_topic(topics[0].uuid).unwrap().unwrap();
    assert_eq!(loaded.name, "Skip lists, revisited");
    assert_eq!(repo.list_all().unwrap().len(), 2);
}
