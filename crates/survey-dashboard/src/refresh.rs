//! Cache refresh scheduling.
//!
//! A [`Refresher`] owns the snapshot store and the remote source. Every
//! refresh (startup, timer or on-demand) runs while holding one mutex, so two
//! refreshes never overlap and the rate-limit check and its update happen
//! as a single step.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use survey_core::{
  Error, Result,
  record::Snapshot,
  store::{ResponseSource, SnapshotStore},
};
use tokio::{
  sync::Mutex,
  task::JoinHandle,
  time::Instant,
};

/// Background polling interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Minimum spacing between on-demand refreshes used when none is configured.
pub const DEFAULT_MIN_SPACING: Duration = Duration::from_secs(60);

/// What an on-demand refresh request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
  /// A new snapshot with this many records was written.
  Refreshed { records: usize },
  /// The previous attempt was too recent; nothing was fetched.
  Skipped { retry_in: Duration },
}

#[derive(Debug, Default)]
struct RefreshState {
  /// Completion time of the last refresh, successful or not.
  last_attempt: Option<Instant>,
}

pub struct Refresher<S, F> {
  store:       S,
  source:      F,
  min_spacing: Duration,
  state:       Mutex<RefreshState>,
}

impl<S, F> Refresher<S, F>
where
  S: SnapshotStore,
  F: ResponseSource,
{
  pub fn new(store: S, source: F, min_spacing: Duration) -> Self {
    Self { store, source, min_spacing, state: Mutex::new(RefreshState::default()) }
  }

  /// Fetch and replace the snapshot unconditionally.
  ///
  /// Used at startup and by the background poller. Returns the number of
  /// records written.
  pub async fn refresh(&self) -> Result<usize> {
    let mut state = self.state.lock().await;
    self.run(&mut state).await
  }

  /// Fetch and replace the snapshot unless the last attempt was less than
  /// the minimum spacing ago.
  ///
  /// A skipped request is not an error; the caller keeps using the current
  /// snapshot.
  pub async fn request_refresh(&self) -> Result<RefreshOutcome> {
    let mut state = self.state.lock().await;
    if let Some(last) = state.last_attempt {
      let elapsed = last.elapsed();
      if elapsed < self.min_spacing {
        let retry_in = self.min_spacing - elapsed;
        tracing::debug!("refresh request ignored, next allowed in {retry_in:?}");
        return Ok(RefreshOutcome::Skipped { retry_in });
      }
    }
    let records = self.run(&mut state).await?;
    Ok(RefreshOutcome::Refreshed { records })
  }

  async fn run(&self, state: &mut RefreshState) -> Result<usize> {
    let result = self.fetch_and_store().await;
    state.last_attempt = Some(Instant::now());
    match &result {
      Ok(records) => tracing::info!("survey data refreshed: {records} responses"),
      Err(e) => tracing::warn!("survey data refresh failed: {e}"),
    }
    result
  }

  async fn fetch_and_store(&self) -> Result<usize> {
    let records = self.source.fetch_all().await?;
    let snapshot = Snapshot::new(records);
    self.store.write(&snapshot).await?;
    Ok(snapshot.len())
  }

  /// Read the current snapshot, refreshing synchronously if none exists.
  pub async fn snapshot(&self) -> Result<Snapshot> {
    if let Some(snapshot) = self.store.read().await? {
      return Ok(snapshot);
    }

    let mut state = self.state.lock().await;
    // Another caller may have written one while we waited for the lock.
    if let Some(snapshot) = self.store.read().await? {
      return Ok(snapshot);
    }
    self.run(&mut state).await?;
    self.store.read().await?.ok_or(Error::NotFound)
  }

  /// When the current snapshot was written.
  pub async fn last_modified(&self) -> Result<DateTime<Utc>> {
    self.store.last_modified().await
  }
}

impl<S, F> Refresher<S, F>
where
  S: SnapshotStore + 'static,
  F: ResponseSource + 'static,
{
  /// Spawn the background loop: sleep `interval`, refresh, repeat.
  ///
  /// Failures are logged and never end the loop.
  pub fn spawn_poller(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
      loop {
        tokio::time::sleep(interval).await;
        // `run` has already logged the failure; the old snapshot stays.
        let _ = self.refresh().await;
      }
    })
  }
}
