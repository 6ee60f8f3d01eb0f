//! Integration tests for quota accounting.

mod helpers;

use cloudvault_core::ErrorKind;
use cloudvault_core::config::AppConfig;
use cloudvault_entity::share::SharePermission;
use cloudvault_entity::storage::FileCategory;
use cloudvault_core::traits::BlobStore;

const CAP: i64 = 10_000;

#[tokio::test]
async fn test_quota_boundary() {
    let app = helpers::TestDrive::with_quota(CAP);
    let owner = app.user("owner@example.com");

    app.upload_sized(&owner, None, "base.bin", (CAP - 100) as usize)
        .await
        .unwrap();
    assert_eq!(app.drive.usage(&owner).await.unwrap().used_bytes, CAP - 100);

    let err = app
        .upload_sized(&owner, None, "too-big.bin", 101)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);

    app.upload_sized(&owner, None, "exact.bin", 100).await.unwrap();
    let quota = app.drive.usage(&owner).await.unwrap();
    assert_eq!(quota.used_bytes, CAP);
    assert_eq!(quota.available_bytes, 0);

    let err = app
        .upload_sized(&owner, None, "again.bin", 100)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);
}

#[tokio::test]
async fn test_trash_frees_quota_only_from_active_usage() {
    let app = helpers::TestDrive::with_quota(CAP);
    let owner = app.user("owner@example.com");

    let big = app
        .upload_sized(&owner, None, "big.bin", CAP as usize)
        .await
        .unwrap();
    app.drive.trash_node(&owner, big.id.into()).await.unwrap();

    assert_eq!(app.drive.usage(&owner).await.unwrap().used_bytes, 0);
    let stats = app.drive.storage_stats(&owner).await.unwrap();
    assert_eq!(stats.trash.bytes, CAP);
    assert_eq!(stats.active.bytes, 0);

    app.upload_sized(&owner, None, "next.bin", 10).await.unwrap();
}

#[tokio::test]
async fn test_upload_into_shared_folder_charges_folder_owner() {
    let app = helpers::TestDrive::with_quota(CAP);
    let owner = app.user("owner@example.com");
    let editor = app.user("editor@example.com");

    let shared = app.folder(&owner, "shared", None).await;
    app.share_folder(&owner, shared.id, &editor, SharePermission::Editor)
        .await;
    app.upload_sized(&owner, None, "mine.bin", (CAP - 50) as usize)
        .await
        .unwrap();

    // The editor has plenty of room, but the folder owner does not.
    let err = app
        .upload_sized(&editor, Some(shared.id), "theirs.bin", 51)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);

    let file = app
        .upload_sized(&editor, Some(shared.id), "theirs.bin", 50)
        .await
        .unwrap();
    assert_eq!(file.owner_id, owner.user_id);
    assert_eq!(app.drive.usage(&editor).await.unwrap().used_bytes, 0);
}

#[tokio::test]
async fn test_max_upload_size() {
    let mut config = AppConfig::default();
    config.storage.max_upload_size_bytes = 8;
    let app = helpers::TestDrive::with_config(config);
    let owner = app.user("owner@example.com");

    let err = app.upload_sized(&owner, None, "nine.bin", 9).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    app.upload_sized(&owner, None, "eight.bin", 8).await.unwrap();
}

#[tokio::test]
async fn test_same_name_upload_replaces_file() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let folder = app.folder(&owner, "docs", None).await;

    let first = app.upload(&owner, Some(folder.id), "a.txt", "one").await;
    let second = app.upload(&owner, Some(folder.id), "a.txt", "second").await;

    assert_ne!(first.id, second.id);
    assert!(app.file_row(first.id).await.is_none());
    assert_eq!(app.blobs.len(), 1);
    assert_eq!(app.drive.usage(&owner).await.unwrap().used_bytes, 6);
}

#[tokio::test]
async fn test_replacement_keeps_old_file_when_blob_delete_fails() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let folder = app.folder(&owner, "docs", None).await;

    let first = app.upload(&owner, Some(folder.id), "a.txt", "one").await;
    app.blobs.fail_deletes_for(&first.content_handle);

    let second = app.upload(&owner, Some(folder.id), "a.txt", "second").await;

    assert!(app.file_row(second.id).await.is_some());
    assert!(app.file_row(first.id).await.is_some());
    assert!(app.blobs.exists(&first.content_handle).await.unwrap());
    assert!(app.blobs.exists(&second.content_handle).await.unwrap());
    assert_eq!(app.blobs.len(), 2);
    assert_eq!(app.drive.usage(&owner).await.unwrap().used_bytes, 9);
}

#[tokio::test]
async fn test_upload_into_trashed_folder_is_invalid_state() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let folder = app.folder(&owner, "docs", None).await;
    app.drive.trash_node(&owner, folder.id.into()).await.unwrap();

    let err = app
        .upload_sized(&owner, Some(folder.id), "a.bin", 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert!(app.blobs.is_empty());
}

#[tokio::test]
async fn test_stats_by_category() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");

    for (name, content_type, size) in [
        ("a.png", "image/png", 10usize),
        ("b.pdf", "application/pdf", 20),
        ("c.mp4", "video/mp4", 30),
        ("d.bin", "application/octet-stream", 40),
    ] {
        app.drive
            .upload_file(
                &owner,
                None,
                name,
                Some(content_type),
                bytes::Bytes::from(vec![1u8; size]),
            )
            .await
            .unwrap();
    }
    app.folder(&owner, "empty", None).await;

    let stats = app.drive.storage_stats(&owner).await.unwrap();
    assert_eq!(stats.active.files, 4);
    assert_eq!(stats.active.folders, 1);
    assert_eq!(stats.active.bytes, 100);
    assert_eq!(stats.active.category(FileCategory::Image).bytes, 10);
    assert_eq!(stats.active.category(FileCategory::Pdf).bytes, 20);
    assert_eq!(stats.active.category(FileCategory::Video).bytes, 30);
    assert_eq!(stats.active.category(FileCategory::Other).bytes, 40);
}
