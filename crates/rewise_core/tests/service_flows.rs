use chrono::{DateTime, TimeZone, Utc};
use rewise_core::db::open_db_in_memory;
use rewise_core::{
    RepoError, SqliteTopicRepository, TopicDetails, TopicListItem, TopicService, GROUP_TODAY,
    GROUP_UPCOMING,
};
use uuid::Uuid;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

fn details(name: &str) -> TopicDetails {
    TopicDetails {
        name: name.to_string(),
        description: String::new(),
        resource_link: String::new(),
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
}

#[test]
fn add_topic_starts_at_stage_zero_due_tomorrow() {
    let conn = open_db_in_memory().unwrap();
    let service = TopicService::new(SqliteTopicRepository::try_new(&conn).unwrap());

    let request = TopicDetails {
        name: "  CAP theorem  ".to_string(),
        description: " consistency tradeoffs ".to_string(),
        resource_link: String::new(),
    };
    let topic = service.add_topic(&request, &now()).unwrap();

    assert_eq!(topic.name, "CAP theorem");
    assert_eq!(topic.description, "consistency tradeoffs");
    assert_eq!(topic.stage, 0);
    assert_eq!(topic.next_revision_at, now().timestamp_millis() + MS_PER_DAY);

    let stored = service.get_topic(topic.uuid).unwrap().unwrap();
    assert_eq!(stored, topic);
}

#[test]
fn add_topic_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let service = TopicService::new(SqliteTopicRepository::try_new(&conn).unwrap());

    let err = service.add_topic(&details("   "), &now()).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn edit_details_leaves_schedule_state_untouched() {
    let conn = open_db_in_memory().unwrap();
    let service = TopicService::new(SqliteTopicRepository::try_new(&conn).unwrap());

    let created = service.add_topic(&details("Raft"), &now()).unwrap();
    let advanced = service.complete_revision(created.uuid, &now()).unwrap();

    let edited = service
        .edit_details(
            created.uuid,
            &TopicDetails {
                name: "Raft consensus".to_string(),
                description: "leader election".to_string(),
                resource_link: "https://example.com/raft".to_string(),
            },
        )
        .unwrap();

    assert_eq!(edited.name, "Raft consensus");
    assert_eq!(edited.stage, advanced.stage);
    assert_eq!(edited.next_revision_at, advanced.next_revision_at);
}

#[test]
fn complete_revision_advances_stage_and_due_date() {
    let conn = open_db_in_memory().unwrap();
    let service = TopicService::new(SqliteTopicRepository::try_new(&conn).unwrap());

    let created = service.add_topic(&details("Paxos"), &now()).unwrap();

    // Stage 0 completes with a 1-day interval.
    let first = service.complete_revision(created.uuid, &now()).unwrap();
    assert_eq!(first.stage, 1);
    assert_eq!(first.next_revision_at, now().timestamp_millis() + MS_PER_DAY);

    // Stage 1 completes with a 3-day interval from the later "now".
    let later = Utc.with_ymd_and_hms(2026, 3, 11, 10, 0, 0).unwrap();
    let second = service.complete_revision(created.uuid, &later).unwrap();
    assert_eq!(second.stage, 2);
    assert_eq!(
        second.next_revision_at,
        later.timestamp_millis() + 3 * MS_PER_DAY
    );
}

#[test]
fn complete_revision_for_missing_topic_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = TopicService::new(SqliteTopicRepository::try_new(&conn).unwrap());

    let err = service.complete_revision(Uuid::new_v4(), &now()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn snap_overdue_moves_only_overdue_topics() {
    let conn = open_db_in_memory().unwrap();
    let service = TopicService::new(SqliteTopicRepository::try_new(&conn).unwrap());

    let two_days_ago = Utc.with_ymd_and_hms(2026, 3, 8, 9, 0, 0).unwrap();
    let overdue = service.add_topic(&details("overdue"), &two_days_ago).unwrap();
    let fresh = service.add_topic(&details("fresh"), &now()).unwrap();

    let snapped = service.snap_overdue_to_now(overdue.uuid, &now()).unwrap();
    assert_eq!(snapped.next_revision_at, now().timestamp_millis());

    let untouched = service.snap_overdue_to_now(fresh.uuid, &now()).unwrap();
    assert_eq!(untouched.next_revision_at, fresh.next_revision_at);
}

#[test]
fn retired_topics_leave_the_grouped_view_and_due_count() {
    let conn = open_db_in_memory().unwrap();
    let service = TopicService::new(SqliteTopicRepository::try_new(&conn).unwrap());

    let yesterday = Utc.with_ymd_and_hms(2026, 3, 9, 9, 0, 0).unwrap();
    let due_topic = service.add_topic(&details("due"), &yesterday).unwrap();
    assert_eq!(service.due_count(&now()).unwrap(), 1);

    service.retire_topic(due_topic.uuid).unwrap();
    assert_eq!(service.due_count(&now()).unwrap(), 0);
    assert!(service.grouped_view(&now()).unwrap().is_empty());
}

#[test]
fn grouped_view_reflects_store_order_and_sections() {
    let conn = open_db_in_memory().unwrap();
    let service = TopicService::new(SqliteTopicRepository::try_new(&conn).unwrap());

    let yesterday = Utc.with_ymd_and_hms(2026, 3, 9, 9, 0, 0).unwrap();
    let next_week = Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap();
    let due = service.add_topic(&details("due"), &yesterday).unwrap();
    let ahead = service.add_topic(&details("ahead"), &next_week).unwrap();

    let rows = service.grouped_view(&now()).unwrap();
    assert_eq!(
        rows,
        vec![
            TopicListItem::Header(GROUP_TODAY.to_string()),
            TopicListItem::Entry(due),
            TopicListItem::Header(GROUP_UPCOMING.to_string()),
            TopicListItem::Entry(ahead),
        ]
    );
}
