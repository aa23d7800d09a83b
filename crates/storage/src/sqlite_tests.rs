// SPDX-License-Identifier: MIT

use super::*;
use std::path::PathBuf;

fn record(path: &str, hash: &str) -> FileRecord {
    FileRecord {
        path: PathBuf::from(path),
        name: PathBuf::from(path)
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned(),
        size_bytes: 42,
        modified_at_ms: 1,
        content_hash: hash.to_string(),
        indexed_at_ms: 2,
    }
}

#[test]
fn init_is_idempotent() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.init().unwrap();
    store.init().unwrap();
}

#[test]
fn upsert_then_find_by_path_round_trips() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.init().unwrap();
    let rec = record("/tmp/a/one.txt", &"a".repeat(64));
    store.upsert(&rec).unwrap();

    let found = store.find_by_path(&rec.path).unwrap().unwrap();
    assert_eq!(found, rec);
}

#[test]
fn upsert_on_existing_path_overwrites_not_duplicates() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.init().unwrap();
    let mut rec = record("/tmp/a/one.txt", &"a".repeat(64));
    store.upsert(&rec).unwrap();

    rec.size_bytes = 99;
    rec.content_hash = "b".repeat(64);
    rec.indexed_at_ms = 50;
    store.upsert(&rec).unwrap();

    let all = store.find_by_name("one.txt").unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].size_bytes, 99);
    assert_eq!(all[0].content_hash, "b".repeat(64));
}

#[test]
fn find_by_name_matches_exact_basename() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.init().unwrap();
    store.upsert(&record("/tmp/a/one.txt", &"a".repeat(64))).unwrap();
    store.upsert(&record("/tmp/b/one.txt", &"b".repeat(64))).unwrap();
    store.upsert(&record("/tmp/b/two.txt", &"c".repeat(64))).unwrap();

    let found = store.find_by_name("one.txt").unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn find_by_criteria_filters_on_size_range() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.init().unwrap();
    let mut small = record("/tmp/small.txt", &"a".repeat(64));
    small.size_bytes = 10;
    let mut big = record("/tmp/big.txt", &"b".repeat(64));
    big.size_bytes = 10_000;
    store.upsert(&small).unwrap();
    store.upsert(&big).unwrap();

    let all = store.find_by_criteria(0, None).unwrap();
    assert_eq!(all.len(), 2);

    let only_small = store.find_by_criteria(0, Some(100)).unwrap();
    assert_eq!(only_small.len(), 1);
    assert_eq!(only_small[0].path, small.path);
}

#[test]
fn find_files_with_hashes_matches_requested_set() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.init().unwrap();
    let a = record("/tmp/a.txt", &"a".repeat(64));
    let b = record("/tmp/b.txt", &"b".repeat(64));
    store.upsert(&a).unwrap();
    store.upsert(&b).unwrap();

    let found = store.find_files_with_hashes(&[a.content_hash.clone()]).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].path, a.path);
}

#[test]
fn find_files_with_hashes_empty_input_returns_empty() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.init().unwrap();
    assert!(store.find_files_with_hashes(&[]).unwrap().is_empty());
}

#[test]
fn find_by_path_missing_returns_none() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.init().unwrap();
    assert!(store.find_by_path(PathBuf::from("/nope").as_path()).unwrap().is_none());
}

#[test]
fn open_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("index.sqlite3");
    let store = SqliteStore::open(&db_path).unwrap();
    store.init().unwrap();
    store.upsert(&record("/tmp/a.txt", &"a".repeat(64))).unwrap();
    assert!(db_path.exists());
}

#[test]
fn close_does_not_error() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.init().unwrap();
    store.close().unwrap();
}
