//! Integration tests for the track store.

use std::fs;

use fieldtrace::{RenameError, TrackStore};
use tempfile::TempDir;

fn store() -> (TempDir, TrackStore) {
    let dir = TempDir::new().unwrap();
    let store = TrackStore::open(dir.path()).unwrap();
    (dir, store)
}

/// Put a minimal valid document into the named track directory.
fn seed_track(store: &TrackStore, name: &str) {
    let dir = store.create(name).unwrap();
    fs::write(
        dir.join("track.xml"),
        "<?xml version=\"1.0\"?><osm version=\"0.6\" generator=\"fieldtrace\"></osm>",
    )
    .unwrap();
}

#[test]
fn open_creates_the_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nested").join("tracks");
    let store = TrackStore::open(&root).unwrap();
    assert!(root.is_dir());
    assert!(store.list().is_empty());
}

#[test]
fn exists_requires_a_document() {
    let (_dir, store) = store();
    store.create("empty").unwrap();
    assert!(!store.exists("empty"));

    seed_track(&store, "saved");
    assert!(store.exists("saved"));
}

#[test]
fn list_returns_sorted_names() {
    let (_dir, store) = store();
    seed_track(&store, "b-track");
    seed_track(&store, "a-track");

    assert_eq!(store.list(), vec!["a-track", "b-track"]);
}

#[test]
fn list_sweeps_directories_without_a_document() {
    let (_dir, store) = store();
    seed_track(&store, "good");
    store.create("stale").unwrap();

    assert_eq!(store.list(), vec!["good"]);
    assert!(!store.track_dir("stale").exists());
}

#[test]
fn delete_removes_document_and_media() {
    let (_dir, store) = store();
    seed_track(&store, "doomed");
    fs::write(store.track_dir("doomed").join("photo.jpg"), b"jpeg").unwrap();

    store.delete("doomed").unwrap();
    assert!(!store.track_dir("doomed").exists());
    assert!(store.delete("doomed").is_ok());
}

#[test]
fn rename_moves_the_directory() {
    let (_dir, store) = store();
    seed_track(&store, "old-name");

    store.rename("old-name", "new-name").unwrap();
    assert!(!store.exists("old-name"));
    assert!(store.exists("new-name"));
}

#[test]
fn rename_reports_missing_source() {
    let (_dir, store) = store();
    assert_eq!(
        store.rename("ghost", "anything"),
        Err(RenameError::SourceMissing("ghost".to_string()))
    );
}

#[test]
fn rename_conflict_leaves_both_tracks_untouched() {
    let (_dir, store) = store();
    seed_track(&store, "A");
    seed_track(&store, "B");

    assert_eq!(
        store.rename("A", "B"),
        Err(RenameError::DestinationExists("B".to_string()))
    );
    assert!(store.exists("A"));
    assert!(store.exists("B"));
}
