//! In-process fakes for the store and the remote source.

use std::{
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
  time::Duration,
};

use chrono::{DateTime, Utc};
use survey_core::{
  Error, FetchError, Result,
  record::{ResponseRecord, Snapshot},
  store::{ResponseSource, SnapshotStore},
};

/// A single-slot store held in memory.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
  slot: Arc<Mutex<Option<(Snapshot, DateTime<Utc>)>>>,
  fail: Arc<AtomicBool>,
}

impl MemoryStore {
  pub fn with_snapshot(snapshot: Snapshot) -> Self {
    let store = Self::default();
    *store.slot.lock().unwrap() = Some((snapshot, Utc::now()));
    store
  }

  pub fn fail_writes(&self, fail: bool) {
    self.fail.store(fail, Ordering::SeqCst);
  }

  pub fn current(&self) -> Option<Snapshot> {
    self.slot.lock().unwrap().as_ref().map(|(s, _)| s.clone())
  }
}

impl SnapshotStore for MemoryStore {
  async fn write(&self, snapshot: &Snapshot) -> Result<()> {
    if self.fail.load(Ordering::SeqCst) {
      return Err(Error::cache_io(std::io::Error::other("disk full")));
    }
    *self.slot.lock().unwrap() = Some((snapshot.clone(), Utc::now()));
    Ok(())
  }

  async fn read(&self) -> Result<Option<Snapshot>> {
    Ok(self.current())
  }

  async fn last_modified(&self) -> Result<DateTime<Utc>> {
    self
      .slot
      .lock()
      .unwrap()
      .as_ref()
      .map(|(_, at)| *at)
      .ok_or(Error::NotFound)
  }
}

/// A remote source returning canned records and counting invocations.
#[derive(Clone, Default)]
pub(crate) struct FakeSource {
  records:  Arc<Mutex<Vec<ResponseRecord>>>,
  failures: Arc<AtomicUsize>,
  calls:    Arc<AtomicUsize>,
  delay:    Duration,
}

impl FakeSource {
  pub fn new(records: Vec<ResponseRecord>) -> Self {
    Self { records: Arc::new(Mutex::new(records)), ..Default::default() }
  }

  /// Make the next `n` fetches fail with a network error.
  pub fn fail_next(&self, n: usize) {
    self.failures.store(n, Ordering::SeqCst);
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  pub fn set_records(&self, records: Vec<ResponseRecord>) {
    *self.records.lock().unwrap() = records;
  }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl ResponseSource for FakeSource {
  async fn fetch_all(&self) -> Result<Vec<ResponseRecord>, FetchError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    let failing = self
      .failures
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
      .is_ok();
    if failing {
      return Err(FetchError::Network("connection refused".into()));
    }
    Ok(self.records.lock().unwrap().clone())
  }
}

/// Settings with a Helsinki default cutoff of 20.05.2025 18:00.
pub(crate) fn settings() -> crate::DashboardSettings {
  use chrono_tz::Europe::Helsinki;
  use survey_core::{cutoff::CutoffSetting, summary::Question};

  let questions = [
    ("lastpage", "Last Page Reached"),
    ("is_completed", "Completed Survey"),
    ("q1age", "Age"),
    ("q1gender", "Gender"),
  ]
  .into_iter()
  .map(|(code, label)| Question { code: code.into(), label: label.into() })
  .collect();

  crate::DashboardSettings {
    title:          "Survey Dashboard".into(),
    timezone:       Helsinki,
    default_cutoff: CutoffSetting::parse_local("2025-05-20T18:00", Helsinki)
      .unwrap(),
    questions,
    page_reload:    Duration::from_secs(900),
  }
}
