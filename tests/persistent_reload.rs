//! Catalog data surviving a process restart on the file-backed area.
//!
//! These tests verify that:
//! - collections written by one catalog are read back after reopening
//! - media metadata survives while session payloads do not
//! - a damaged snapshot fails closed to first-run defaults

#![cfg(feature = "persistent")]

mod common;

use std::fs;

use firefly::storage::FileStorageConfig;
use firefly::{Catalog, CatalogConfig, CategoryDraft, MediaKind, StoryDraft};
use tempfile::tempdir;

fn fast() -> FileStorageConfig {
    FileStorageConfig {
        sync_on_write: false,
        ..FileStorageConfig::default()
    }
}

#[test]
fn test_catalog_survives_reopen() {
    common::init_tracing();
    let dir = tempdir().unwrap();

    let (story, category) = {
        let catalog = Catalog::open(dir.path(), fast(), CatalogConfig::default()).unwrap();
        let category = catalog.categories().add(CategoryDraft::new("Ocean")).unwrap();
        let story = catalog
            .stories()
            .add(StoryDraft::new("The Little Whale", category.id.clone()).duration(9))
            .unwrap();
        catalog.stories().record_view(&story.id).unwrap();
        catalog.favorites().add(&story.id).unwrap();
        catalog.session().change_password("admin123", "whales!", "whales!").unwrap();
        (story, category)
    };

    let catalog = Catalog::open(dir.path(), fast(), CatalogConfig::default()).unwrap();
    let reread = catalog.stories().get(&story.id).unwrap().unwrap();
    assert_eq!(reread.views, 1);
    assert_eq!(reread.title, story.title);
    assert!(catalog.categories().get(&category.id).unwrap().is_some());
    assert_eq!(catalog.favorites().ids(), vec![story.id]);
    assert_eq!(catalog.session().stored_password().as_deref(), Some("whales!"));
    assert!(!catalog.session().is_authenticated());
}

#[test]
fn test_media_payload_is_session_scoped_on_disk_too() {
    common::init_tracing();
    let dir = tempdir().unwrap();

    let record = {
        let catalog = Catalog::open(dir.path(), fast(), CatalogConfig::default()).unwrap();
        catalog.media().upload(MediaKind::Video, "waves.mp4", vec![3u8; 256]).unwrap()
    };

    let catalog = Catalog::open(dir.path(), fast(), CatalogConfig::default()).unwrap();
    assert_eq!(catalog.media().list_by_kind(MediaKind::Video).unwrap(), vec![record.clone()]);
    assert!(catalog.media().handles().resolve(&record.url).is_none());
}

#[test]
fn test_damaged_snapshot_falls_back_to_seed() {
    common::init_tracing();
    let dir = tempdir().unwrap();

    {
        let catalog = Catalog::open(dir.path(), fast(), CatalogConfig::default()).unwrap();
        catalog.stories().add(StoryDraft::new("Lost", "bedtime")).unwrap();
    }

    let snapshot = dir.path().join("storage.kv");
    let mut bytes = fs::read(&snapshot).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&snapshot, bytes).unwrap();

    let catalog = Catalog::open(dir.path(), fast(), CatalogConfig::default()).unwrap();
    assert_eq!(catalog.stories().list().unwrap(), firefly::seed::default_stories());
}

#[test]
fn test_second_catalog_on_same_directory_is_refused() {
    let dir = tempdir().unwrap();
    let _first = Catalog::open(dir.path(), fast(), CatalogConfig::default()).unwrap();

    let err = Catalog::open(dir.path(), fast(), CatalogConfig::default()).unwrap_err();
    assert!(err.is_persistence());
}
