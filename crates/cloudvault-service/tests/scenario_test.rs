//! End-to-end drive scenarios.

mod helpers;

use std::io::Read;

use futures::StreamExt;

use cloudvault_core::ErrorKind;
use cloudvault_entity::share::SharePermission;

#[tokio::test]
async fn test_editor_upload_into_shared_folder() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let user = app.user("u@example.com");

    let a = app.folder(&owner, "A", None).await;
    app.share_folder(&owner, a.id, &user, SharePermission::Editor)
        .await;
    let before = app.drive.usage(&owner).await.unwrap().used_bytes;

    let x = app.upload(&user, Some(a.id), "x.txt", "hello").await;
    assert_eq!(x.owner_id, owner.user_id);
    assert_ne!(x.owner_id, user.user_id);
    assert_eq!(
        app.drive.usage(&owner).await.unwrap().used_bytes,
        before + 5
    );

    let renamed = app
        .drive
        .rename_node(&user, x.id.into(), "greeting")
        .await
        .unwrap();
    assert_eq!(renamed.name(), "greeting.txt");

    let err = app
        .drive
        .permanently_delete_node(&user, x.id.into())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);

    // Still denied once the file is in the trash.
    app.drive.trash_node(&user, x.id.into()).await.unwrap();
    let err = app
        .drive
        .permanently_delete_node(&user, x.id.into())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);

    app.drive
        .permanently_delete_node(&owner, x.id.into())
        .await
        .unwrap();
    assert!(app.file_row(x.id).await.is_none());
}

#[tokio::test]
async fn test_open_file_streams_content() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let file = app.upload(&owner, None, "a.txt", "streamed").await;

    let (meta, mut stream) = app.drive.open_file(&owner, file.id).await.unwrap();
    assert_eq!(meta.size_bytes, 8);

    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(body, b"streamed");

    app.drive.trash_node(&owner, file.id.into()).await.unwrap();
    let err = app.drive.open_file(&owner, file.id).await.err().unwrap();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_zip_export_skips_trashed_and_inaccessible() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let reader = app.user("reader@example.com");

    let root = app.folder(&owner, "A", None).await;
    let sub = app.folder(&owner, "B", Some(root.id)).await;
    app.upload(&owner, Some(root.id), "one.txt", "1").await;
    app.upload(&owner, Some(sub.id), "two.txt", "22").await;
    let gone = app.upload(&owner, Some(root.id), "gone.txt", "x").await;
    app.share_folder(&owner, root.id, &reader, SharePermission::Viewer)
        .await;
    app.upload(&owner, Some(sub.id), "private.txt", "p").await;
    app.drive.trash_node(&owner, gone.id.into()).await.unwrap();

    let export = app.drive.export_zip(&reader, root.id.into()).await.unwrap();
    assert_eq!(export.file_name, "A.zip");
    assert_eq!(export.file_count, 2);

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(export.data.to_vec())).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["A/", "A/B/", "A/B/two.txt", "A/one.txt"]);

    let mut content = String::new();
    archive
        .by_name("A/B/two.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "22");

    let owner_export = app.drive.export_zip(&owner, root.id.into()).await.unwrap();
    assert_eq!(owner_export.file_count, 3);

    let stranger = app.user("stranger@example.com");
    let err = app
        .drive
        .export_zip(&stranger, root.id.into())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn test_list_folder_hides_trash() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");

    let root = app.folder(&owner, "root", None).await;
    app.folder(&owner, "keep", Some(root.id)).await;
    let bin = app.folder(&owner, "bin", Some(root.id)).await;
    app.upload(&owner, Some(root.id), "a.txt", "a").await;
    app.drive.trash_node(&owner, bin.id.into()).await.unwrap();

    let listing = app.drive.list_folder(&owner, Some(root.id)).await.unwrap();
    let names: Vec<&str> = listing.folders.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["keep"]);
    assert_eq!(listing.files.len(), 1);

    let top = app.drive.list_folder(&owner, None).await.unwrap();
    assert_eq!(top.folders.len(), 1);
}

#[tokio::test]
async fn test_rename_extension_match_is_case_sensitive() {
    let app = helpers::TestDrive::new();
    let owner = app.user("owner@example.com");
    let file = app.upload(&owner, None, "report.PDF", "x").await;

    let renamed = app
        .drive
        .rename_node(&owner, file.id.into(), "summary.pdf")
        .await
        .unwrap();
    assert_eq!(renamed.name(), "summary.pdf.PDF");

    let renamed = app
        .drive
        .rename_node(&owner, file.id.into(), "final.PDF")
        .await
        .unwrap();
    assert_eq!(renamed.name(), "final.PDF");
}
