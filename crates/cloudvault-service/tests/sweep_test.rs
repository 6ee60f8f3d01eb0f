//! Integration tests for the retention sweep.

mod helpers;

use chrono::{DateTime, Duration, Utc};
use cloudvault_core::ErrorKind;
use cloudvault_core::config::AppConfig;

#[tokio::test]
async fn test_retention_boundary() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let retention = app.config.trash.retention().unwrap();
    let now = Utc::now();

    let expired = app.upload(&owner, None, "expired.txt", "x").await;
    let fresh = app.upload(&owner, None, "fresh.txt", "y").await;
    app.tree
        .files
        .set_trashed(expired.id, Some(now - retention - Duration::seconds(1)))
        .await
        .unwrap();
    app.tree
        .files
        .set_trashed(fresh.id, Some(now - retention + Duration::seconds(1)))
        .await
        .unwrap();

    let report = app.drive.sweep_expired_trash(now).await.unwrap();
    assert_eq!(report.files_purged, 1);
    assert_eq!(report.failed, 0);

    assert!(app.file_row(expired.id).await.is_none());
    assert!(app.file_row(fresh.id).await.unwrap().is_trashed);
    assert_eq!(app.blobs.len(), 1);
}

#[tokio::test]
async fn test_expired_folder_purges_subtree() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let now = Utc::now();

    let root = app.folder(&owner, "root", None).await;
    let sub = app.folder(&owner, "sub", Some(root.id)).await;
    let file = app.upload(&owner, Some(sub.id), "x.txt", "x").await;

    let mut past = owner.clone();
    past.request_time = now - Duration::days(365);
    app.drive.trash_node(&past, root.id.into()).await.unwrap();

    let report = app.drive.sweep_expired_trash(now).await.unwrap();
    // Files are swept first. The subfolder is purged either as its own
    // candidate or as part of the root's cascade.
    assert_eq!(report.files_purged, 1);
    assert_eq!(report.failed, 0);
    assert!(app.folder_row(root.id).await.is_none());
    assert!(app.folder_row(sub.id).await.is_none());
    assert!(app.file_row(file.id).await.is_none());
    assert!(app.blobs.is_empty());
}

#[tokio::test]
async fn test_failure_does_not_block_other_candidates() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let now = Utc::now();
    let long_ago = now - Duration::days(400);

    let broken = app.upload(&owner, None, "broken.txt", "x").await;
    let fine = app.upload(&owner, None, "fine.txt", "y").await;
    for id in [broken.id, fine.id] {
        app.tree.files.set_trashed(id, Some(long_ago)).await.unwrap();
    }
    app.blobs.fail_deletes_for(&broken.content_handle);

    let report = app.drive.sweep_expired_trash(now).await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.files_purged, 1);
    assert!(app.file_row(broken.id).await.is_some());
    assert!(app.file_row(fine.id).await.is_none());

    app.blobs.heal();
    let report = app.drive.sweep_expired_trash(now).await.unwrap();
    assert_eq!(report.files_purged, 1);
    assert!(app.file_row(broken.id).await.is_none());
}

#[tokio::test]
async fn test_restored_candidate_is_skipped() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let now = Utc::now();

    let file = app.upload(&owner, None, "x.txt", "x").await;
    app.tree
        .files
        .set_trashed(file.id, Some(now - Duration::days(400)))
        .await
        .unwrap();
    app.drive.restore_node(&owner, file.id.into()).await.unwrap();

    let report = app.drive.sweep_expired_trash(now).await.unwrap();
    assert_eq!(report.files_purged, 0);
    assert!(app.file_row(file.id).await.is_some());
}

#[tokio::test]
async fn test_sweep_cutoff_before_earliest_time_is_configuration_error() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let file = app.upload(&owner, None, "a.txt", "x").await;
    app.drive.trash_node(&owner, file.id.into()).await.unwrap();

    let err = app
        .drive
        .sweep_expired_trash(DateTime::<Utc>::MIN_UTC)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
    assert!(app.file_row(file.id).await.is_some());
}

#[test]
fn test_drive_rejects_unrepresentable_retention() {
    let mut config = AppConfig::default();
    config.trash.retention_days = i64::MAX;
    let Err(err) = helpers::TestDrive::try_with_config(config) else {
        panic!("drive accepted an unrepresentable retention window");
    };
    assert_eq!(err.kind, ErrorKind::Configuration);
}
