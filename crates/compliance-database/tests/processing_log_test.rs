//! Append-only processing log behaviour.

mod common;

use chrono::{Duration, Utc};

use common::TestDb;
use compliance_core::error::ErrorKind;
use compliance_core::types::pagination::PageRequest;
use compliance_database::repositories::{ProcessingLogFilter, ProcessingLogRepository};
use compliance_entity::processing_log::{ActivityType, CreateDataProcessingLog, LegalBasis};

#[tokio::test]
async fn record_gets_server_assigned_timestamp() {
    let db = TestDb::migrated().await;
    let repo = ProcessingLogRepository::new(db.pool.clone());

    let entry = repo
        .record(
            &CreateDataProcessingLog::new(42, ActivityType::DataAccess)
                .with_request("get", "/api/users/42/profile")
                .with_client(Some("203.0.113.7".into()), Some("curl/8.5".into())),
        )
        .await
        .unwrap();

    assert!(entry.id > 0);
    assert_eq!(entry.user_id, 42);
    assert_eq!(entry.activity(), ActivityType::DataAccess);
    assert_eq!(entry.method.as_deref(), Some("GET"));

    let stored = repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.timestamp, entry.timestamp);

    db.cleanup().await;
}

#[tokio::test]
async fn raw_insert_without_timestamp_is_defaulted() {
    let db = TestDb::migrated().await;

    let timestamp: chrono::DateTime<Utc> = sqlx::query_scalar(
        "INSERT INTO fastapi_data_processing_logs (user_id, activity_type) \
         VALUES (1, 'data_export') RETURNING \"timestamp\"",
    )
    .fetch_one(&db.pool)
    .await
    .unwrap();
    assert!(timestamp > Utc::now() - Duration::days(1));

    db.cleanup().await;
}

#[tokio::test]
async fn insert_without_required_columns_is_rejected() {
    let db = TestDb::migrated().await;

    let no_user = sqlx::query(
        "INSERT INTO fastapi_data_processing_logs (activity_type) VALUES ('data_access')",
    )
    .execute(&db.pool)
    .await;
    assert!(no_user.is_err());

    let no_activity =
        sqlx::query("INSERT INTO fastapi_data_processing_logs (user_id) VALUES (1)")
            .execute(&db.pool)
            .await;
    assert!(no_activity.is_err());

    db.cleanup().await;
}

#[tokio::test]
async fn invalid_entry_is_rejected_before_insert() {
    let db = TestDb::migrated().await;
    let repo = ProcessingLogRepository::new(db.pool.clone());

    let err = repo
        .record(&CreateDataProcessingLog::new(1, ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let page = repo
        .search(&ProcessingLogFilter::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_items, 0);

    db.cleanup().await;
}

#[tokio::test]
async fn justification_fields_round_trip() {
    let db = TestDb::migrated().await;
    let repo = ProcessingLogRepository::new(db.pool.clone());

    let entry = repo
        .record(
            &CreateDataProcessingLog::new(9, ActivityType::DataDeletion)
                .with_justification(
                    "erasure request",
                    vec!["profile".into(), "messages".into()],
                    LegalBasis::LegalObligation,
                )
                .performed_by(1),
        )
        .await
        .unwrap();

    assert_eq!(entry.categories().unwrap(), vec!["profile", "messages"]);
    assert_eq!(entry.basis().unwrap(), Some(LegalBasis::LegalObligation));
    assert_eq!(entry.purpose.as_deref(), Some("erasure request"));
    assert!(entry.is_delegated());

    db.cleanup().await;
}

#[tokio::test]
async fn search_filters_and_pages() {
    let db = TestDb::migrated().await;
    let repo = ProcessingLogRepository::new(db.pool.clone());

    for _ in 0..3 {
        repo.record(&CreateDataProcessingLog::new(1, ActivityType::DataAccess))
            .await
            .unwrap();
    }
    repo.record(&CreateDataProcessingLog::new(1, ActivityType::DataExport))
        .await
        .unwrap();
    repo.record(&CreateDataProcessingLog::new(2, ActivityType::DataAccess).performed_by(99))
        .await
        .unwrap();
    repo.record(&CreateDataProcessingLog::new(2, "profiling"))
        .await
        .unwrap();

    let user_one = ProcessingLogFilter {
        user_id: Some(1),
        ..Default::default()
    };
    let first = repo.search(&user_one, &PageRequest::new(1, 3)).await.unwrap();
    assert_eq!(first.total_items, 4);
    assert_eq!(first.items.len(), 3);
    assert!(first.has_next);
    let second = repo.search(&user_one, &PageRequest::new(2, 3)).await.unwrap();
    assert_eq!(second.items.len(), 1);
    let beyond = repo
        .search(&user_one, &PageRequest::new(u64::MAX, 3))
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_items, 4);
    assert!(!beyond.has_next);

    let accesses = ProcessingLogFilter {
        activity_type: Some(ActivityType::DataAccess),
        ..Default::default()
    };
    assert_eq!(
        repo.search(&accesses, &PageRequest::default()).await.unwrap().total_items,
        4
    );

    let by_admin = ProcessingLogFilter {
        performed_by_user_id: Some(99),
        ..Default::default()
    };
    let delegated = repo.search(&by_admin, &PageRequest::default()).await.unwrap();
    assert_eq!(delegated.total_items, 1);
    assert_eq!(delegated.items[0].user_id, 2);

    let custom = ProcessingLogFilter {
        activity_type: Some(ActivityType::from("profiling")),
        ..Default::default()
    };
    let profiling = repo.search(&custom, &PageRequest::default()).await.unwrap();
    assert_eq!(profiling.items[0].activity(), ActivityType::Other("profiling".into()));

    let future = ProcessingLogFilter {
        since: Some(Utc::now() + Duration::days(1)),
        ..Default::default()
    };
    assert_eq!(
        repo.search(&future, &PageRequest::default()).await.unwrap().total_items,
        0
    );

    db.cleanup().await;
}

#[tokio::test]
async fn subject_export_is_oldest_first() {
    let db = TestDb::migrated().await;
    let repo = ProcessingLogRepository::new(db.pool.clone());

    let first = repo
        .record(&CreateDataProcessingLog::new(5, ActivityType::DataAccess))
        .await
        .unwrap();
    let second = repo
        .record(&CreateDataProcessingLog::new(5, ActivityType::DataExport))
        .await
        .unwrap();
    repo.record(&CreateDataProcessingLog::new(6, ActivityType::DataAccess))
        .await
        .unwrap();

    let history = repo.find_for_user(5).await.unwrap();
    let ids: Vec<i32> = history.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);

    let recent = repo.count_since(Utc::now() - Duration::days(1)).await.unwrap();
    assert_eq!(recent, 3);

    db.cleanup().await;
}
