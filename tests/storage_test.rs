// ABOUTME: Tests for filesystem object storage and public search path resolution
// ABOUTME: Uses temporary directories to verify metadata sidecars and traversal rejection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use airlab_assistant_builder::errors::ErrorCode;
use airlab_assistant_builder::storage::{
    find_public_object, new_object_path, LocalObjectStorage, ObjectMetadata, ObjectStorage,
};
use bytes::Bytes;
use tempfile::TempDir;
use uuid::Uuid;

fn metadata(file_name: &str) -> ObjectMetadata {
    ObjectMetadata {
        owner_id: Uuid::new_v4(),
        content_type: Some("text/plain".to_owned()),
        file_name: file_name.to_owned(),
    }
}

#[tokio::test]
async fn test_put_get_delete_round_trip() {
    let dir = TempDir::new().unwrap();
    let storage = LocalObjectStorage::new(dir.path().join("objects"))
        .await
        .unwrap();
    let path = new_object_path("menu.txt");
    let meta = metadata("menu.txt");

    storage
        .put(&path, Bytes::from_static(b"Pizza 12 EUR"), &meta)
        .await
        .unwrap();
    assert!(storage.root().join(&path).is_file());

    let (bytes, stored) = storage.get(&path).await.unwrap();
    assert_eq!(bytes.as_ref(), b"Pizza 12 EUR");
    assert_eq!(stored, meta);

    storage.delete(&path).await.unwrap();
    let err = storage.get(&path).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    // Deleting twice is fine
    storage.delete(&path).await.unwrap();
}

#[tokio::test]
async fn test_traversal_paths_never_touch_disk() {
    let dir = TempDir::new().unwrap();
    let storage = LocalObjectStorage::new(dir.path()).await.unwrap();

    for bad in ["../escape.txt", "/etc/passwd", "uploads/../../x", "uploads\\x"] {
        let err = storage
            .put(bad, Bytes::from_static(b"x"), &metadata("x"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput, "{bad}");
    }
    assert!(!dir.path().parent().unwrap().join("escape.txt").exists());
}

#[tokio::test]
async fn test_find_public_object_uses_first_match() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    std::fs::create_dir_all(second.path().join("css")).unwrap();
    std::fs::write(second.path().join("css/site.css"), "body{}").unwrap();
    std::fs::write(first.path().join("logo.svg"), "<svg/>").unwrap();
    std::fs::write(second.path().join("logo.svg"), "<svg id=\"second\"/>").unwrap();
    let search = vec![first.path().to_path_buf(), second.path().to_path_buf()];

    let found = find_public_object(&search, "css/site.css").await.unwrap();
    assert_eq!(found, Some(second.path().join("css/site.css")));

    let logo = find_public_object(&search, "logo.svg").await.unwrap();
    assert_eq!(logo, Some(first.path().join("logo.svg")));

    assert!(find_public_object(&search, "missing.png")
        .await
        .unwrap()
        .is_none());
    // Directories are not served
    assert!(find_public_object(&search, "css").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_public_object_rejects_traversal() {
    let dir = TempDir::new().unwrap();
    let err = find_public_object(&[dir.path().to_path_buf()], "../secret")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}
