mod common;

use std::sync::Arc;
use url_shortener::domain::entities::UrlToDelete;
use url_shortener::domain::repositories::{BulkUrlRepository, UrlRepository};
use url_shortener::infrastructure::persistence::InMemoryUrlRepository;
use url_shortener::infrastructure::snapshot::{FileSnapshot, SnapshotError};

#[tokio::test]
async fn test_restart_preserves_records_and_deletion_flags() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = FileSnapshot::new(dir.path().join("urls.jsonl"));

    let first = InMemoryUrlRepository::new();
    let kept = common::create_test_url(&first, "https://example.com/kept", 1).await;
    let removed = common::create_test_url(&first, "https://example.com/removed", 1).await;
    first.delete_batch(vec![UrlToDelete::new(removed, 1)]).await;

    assert_eq!(snapshot.save_from(&first).await.unwrap(), 2);

    let second = InMemoryUrlRepository::new();
    assert_eq!(snapshot.restore_into(&second).await.unwrap(), 2);

    assert_eq!(second.export_all().await.unwrap(), first.export_all().await.unwrap());

    let listed = second.list_by_owner(1).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, kept);
    assert!(second.find_by_id(removed).await.unwrap().unwrap().deleted);
}

#[tokio::test]
async fn test_ids_continue_after_restore() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = FileSnapshot::new(dir.path().join("urls.jsonl"));

    let first = InMemoryUrlRepository::new();
    common::create_test_url(&first, "https://example.com/1", 1).await;
    common::create_test_url(&first, "https://example.com/2", 1).await;
    snapshot.save_from(&first).await.unwrap();

    let second = InMemoryUrlRepository::new();
    snapshot.restore_into(&second).await.unwrap();

    let id = common::create_test_url(&second, "https://example.com/3", 1).await;
    assert_eq!(id, 3);
}

#[tokio::test]
async fn test_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = FileSnapshot::new(dir.path().join("absent.jsonl"));
    let repository = InMemoryUrlRepository::new();

    assert_eq!(snapshot.restore_into(&repository).await.unwrap(), 0);
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn test_malformed_file_fails_restore() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("urls.jsonl");
    tokio::fs::write(&path, "{\"id\":1}\n").await.unwrap();
    let snapshot = FileSnapshot::new(&path);
    let repository = InMemoryUrlRepository::new();

    let result = snapshot.restore_into(&repository).await;

    assert!(matches!(result, Err(SnapshotError::Format { line: 1, .. })));
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn test_save_to_unwritable_location_fails() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = FileSnapshot::new(dir.path().join("missing-dir").join("urls.jsonl"));
    let repository = Arc::new(InMemoryUrlRepository::new());
    common::create_test_url(&repository, "https://example.com", 1).await;

    let result = snapshot.save_from(repository.as_ref()).await;

    assert!(matches!(result, Err(SnapshotError::Io { .. })));
}
