//! The filter engine.
//!
//! [`filter`] is a pure function over a borrowed [`Snapshot`]; it has no
//! hidden state, so identical arguments always yield identical views.

use chrono::{DateTime, Utc};

use crate::record::{ResponseRecord, Snapshot};

/// The records of a snapshot that survived filtering. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredView<'a> {
  records: Vec<&'a ResponseRecord>,
}

impl<'a> FilteredView<'a> {
  pub fn records(&self) -> &[&'a ResponseRecord] { &self.records }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = &'a ResponseRecord> + '_ {
    self.records.iter().copied()
  }
}

/// Restrict `snapshot` to records started strictly after `cutoff`, and to
/// completed records if `completed_only` is set.
///
/// Records without a start timestamp never match. An empty result is a
/// valid view, not an error.
pub fn filter(
  snapshot: &Snapshot,
  cutoff: DateTime<Utc>,
  completed_only: bool,
) -> FilteredView<'_> {
  let records = snapshot
    .records
    .iter()
    .filter(|r| r.started_at.is_some_and(|t| t > cutoff))
    .filter(|r| !completed_only || r.is_completed)
    .collect();
  FilteredView { records }
}
