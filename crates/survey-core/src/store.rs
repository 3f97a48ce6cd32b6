//! The `SnapshotStore` and `ResponseSource` traits.
//!
//! Storage backends (e.g. `survey-store-file`) implement [`SnapshotStore`];
//! remote survey clients (e.g. `survey-limesurvey`) implement
//! [`ResponseSource`]. The dashboard depends on these abstractions only.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  FetchError, Result,
  record::{ResponseRecord, Snapshot},
};

/// A single-slot snapshot cache.
///
/// There is at most one snapshot at a time. Every write replaces it
/// wholesale and readers observe either the previous or the new snapshot,
/// never a mix of the two.
pub trait SnapshotStore: Send + Sync {
  /// Atomically replace the stored snapshot.
  fn write<'a>(
    &'a self,
    snapshot: &'a Snapshot,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Read the current snapshot. Returns `None` if nothing was written yet.
  fn read(&self) -> impl Future<Output = Result<Option<Snapshot>>> + Send + '_;

  /// When the current snapshot was last replaced.
  ///
  /// Fails with [`Error::NotFound`](crate::Error::NotFound) before the
  /// first write.
  fn last_modified(
    &self,
  ) -> impl Future<Output = Result<DateTime<Utc>>> + Send + '_;
}

/// A remote source of survey responses.
pub trait ResponseSource: Send + Sync {
  /// Fetch every response of the configured survey.
  fn fetch_all(
    &self,
  ) -> impl Future<Output = Result<Vec<ResponseRecord>, FetchError>> + Send + '_;
}
