//! Integration tests for `FileSnapshotStore` against a scratch directory.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use chrono::{TimeZone, Utc};
use survey_core::{
  Error as CoreError,
  record::{ResponseRecord, Snapshot},
  store::SnapshotStore,
};
use tempfile::TempDir;

use crate::FileSnapshotStore;

fn store() -> (TempDir, FileSnapshotStore) {
  let dir = tempfile::tempdir().expect("temp dir");
  let store = FileSnapshotStore::new(dir.path().join("survey_cache.json"));
  (dir, store)
}

fn snapshot(n: usize) -> Snapshot {
  let records = (0..n)
    .map(|i| {
      let mut answers = BTreeMap::new();
      answers.insert("q1age".to_string(), format!("A{}", i % 3));
      ResponseRecord::new(
        Some(format!("token-{i}")),
        Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()),
        Some(i as i64),
        answers,
        3,
      )
    })
    .collect();
  Snapshot::new(records)
}

fn temp_files(dir: &TempDir) -> Vec<String> {
  std::fs::read_dir(dir.path())
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .filter(|name| name.ends_with(".tmp"))
    .collect()
}

// ─── Read / write ────────────────────────────────────────────────────────────

#[tokio::test]
async fn read_before_write_returns_none() {
  let (_dir, s) = store();
  assert!(s.read().await.unwrap().is_none());
}

#[tokio::test]
async fn write_then_read_returns_snapshot() {
  let (dir, s) = store();
  let snap = snapshot(5);
  s.write(&snap).await.unwrap();

  let read = s.read().await.unwrap().unwrap();
  assert_eq!(read, snap);
  assert!(temp_files(&dir).is_empty(), "leftover temp files");
}

#[tokio::test]
async fn write_replaces_previous_snapshot() {
  let (_dir, s) = store();
  s.write(&snapshot(5)).await.unwrap();
  let newer = snapshot(2);
  s.write(&newer).await.unwrap();
  assert_eq!(s.read().await.unwrap().unwrap(), newer);
}

#[tokio::test]
async fn empty_snapshot_is_valid() {
  let (_dir, s) = store();
  s.write(&snapshot(0)).await.unwrap();
  let read = s.read().await.unwrap().unwrap();
  assert!(read.is_empty());
}

#[tokio::test]
async fn write_creates_missing_parent_directory() {
  let dir = tempfile::tempdir().unwrap();
  let s = FileSnapshotStore::new(dir.path().join("nested/cache.json"));
  s.write(&snapshot(1)).await.unwrap();
  assert_eq!(s.read().await.unwrap().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_format_version_is_an_error() {
  let (_dir, s) = store();
  std::fs::write(s.path(), br#"{"format": 99, "snapshot": {"fetched_at": "2025-06-01T12:00:00Z"}}"#)
    .unwrap();
  assert!(matches!(s.read().await, Err(CoreError::CacheIo(_))));
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn crash_between_stage_and_rename_keeps_old_snapshot() {
  let (dir, s) = store();
  let old = snapshot(3);
  s.write(&old).await.unwrap();

  // Stage a new snapshot but never commit, as if the process died here.
  let staged = s.stage(&snapshot(7)).await.unwrap();
  assert!(staged.temp_path.exists());
  assert_eq!(staged.temp_path.parent(), s.path().parent());

  assert_eq!(s.read().await.unwrap().unwrap(), old);
  staged.abort().await;
  assert!(temp_files(&dir).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_readers_never_see_partial_snapshots() {
  let (_dir, s) = store();
  let small = snapshot(1);
  let large = snapshot(2_000);
  s.write(&small).await.unwrap();

  let s = Arc::new(s);
  let writer = {
    let s = s.clone();
    let (small, large) = (small.clone(), large.clone());
    tokio::spawn(async move {
      for i in 0..20 {
        let next = if i % 2 == 0 { &large } else { &small };
        s.write(next).await.unwrap();
      }
    })
  };

  let reader = {
    let s = s.clone();
    tokio::spawn(async move {
      for _ in 0..200 {
        let snap = s.read().await.expect("read never fails").expect("present");
        assert!(snap.len() == 1 || snap.len() == 2_000, "saw {}", snap.len());
        tokio::task::yield_now().await;
      }
    })
  };

  writer.await.unwrap();
  reader.await.unwrap();
}

// ─── Freshness ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn last_modified_before_write_is_not_found() {
  let (_dir, s) = store();
  assert!(matches!(s.last_modified().await, Err(CoreError::NotFound)));
}

#[tokio::test]
async fn last_modified_tracks_latest_write() {
  let (_dir, s) = store();
  // Filesystem timestamps may be truncated to the second.
  let before = Utc::now() - chrono::Duration::seconds(1);
  s.write(&snapshot(1)).await.unwrap();
  let modified = s.last_modified().await.unwrap();

  assert!(modified >= before, "{modified} < {before}");
  assert!(modified < before + chrono::Duration::seconds(30));

  tokio::time::sleep(Duration::from_millis(20)).await;
  s.write(&snapshot(2)).await.unwrap();
  assert!(s.last_modified().await.unwrap() >= modified);
}
