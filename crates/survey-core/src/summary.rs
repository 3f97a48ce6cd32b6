//! Aggregation over a filtered view: per-question value counts and the
//! headline numbers shown above the charts.

use std::{cmp::Ordering, collections::{BTreeMap, HashSet}};

use serde::{Deserialize, Serialize};

use crate::filter::FilteredView;

/// Columns that identify a response rather than answer a question.
const SKIPPED_CODES: &[&str] = &["token", "startdate"];

/// A configured question: answer code plus human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub code:  String,
  pub label: String,
}

/// Value counts for one question, ordered by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionCounts {
  pub code:   String,
  pub label:  String,
  pub counts: Vec<ValueCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
  pub value: String,
  pub count: usize,
}

impl QuestionCounts {
  pub fn max_count(&self) -> usize {
    self.counts.iter().map(|c| c.count).max().unwrap_or(0)
  }
}

/// Count answer values per question in configuration order.
///
/// `token` and `startdate` are never charted, and a question that no record
/// in the view carries is left out entirely.
pub fn aggregate(view: &FilteredView<'_>, questions: &[Question]) -> Vec<QuestionCounts> {
  questions
    .iter()
    .filter(|q| !SKIPPED_CODES.contains(&q.code.as_str()))
    .filter_map(|q| {
      let mut tally: BTreeMap<String, usize> = BTreeMap::new();
      for value in view.iter().filter_map(|r| r.field(&q.code)) {
        *tally.entry(value).or_default() += 1;
      }
      if tally.is_empty() {
        return None;
      }

      let mut counts: Vec<ValueCount> = tally
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
      counts.sort_by(|a, b| compare_values(&a.value, &b.value));

      Some(QuestionCounts {
        code: q.code.clone(),
        label: q.label.clone(),
        counts,
      })
    })
    .collect()
}

/// Numeric values sort numerically and before text; text sorts lexically.
fn compare_values(a: &str, b: &str) -> Ordering {
  match (a.parse::<f64>(), b.parse::<f64>()) {
    (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    (Ok(_), Err(_)) => Ordering::Less,
    (Err(_), Ok(_)) => Ordering::Greater,
    (Err(_), Err(_)) => a.cmp(b),
  }
}

// ─── Intro summary ───────────────────────────────────────────────────────────

/// Headline counts for a filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntroSummary {
  /// Distinct non-null tokens. An empty string counts as a token.
  pub unique_tokens: usize,
  pub partial:       usize,
  pub full:          usize,
}

impl IntroSummary {
  pub fn from_view(view: &FilteredView<'_>) -> Self {
    let unique_tokens = view
      .iter()
      .filter_map(|r| r.token.as_deref())
      .collect::<HashSet<_>>()
      .len();
    let full = view.iter().filter(|r| r.is_completed).count();
    Self { unique_tokens, partial: view.len() - full, full }
  }

  pub fn total(&self) -> usize { self.partial + self.full }

  pub fn is_empty(&self) -> bool { self.total() == 0 }

  /// The sentence shown above the charts.
  pub fn describe(&self, data_updated: &str, cutoff: &str) -> String {
    if self.is_empty() {
      return format!(
        "No responses satisfy the current criteria: 0 unique tokens, \
         0 PARTIAL and 0 FULL responses. Data updated {data_updated}. \
         Showing responses after {cutoff}."
      );
    }
    format!(
      "This dashboard shows live results for selected survey variables. \
       Currently {} unique tokens with total {} PARTIAL and {} FULL \
       responses. Data updated {data_updated}. Showing responses after \
       {cutoff}.",
      self.unique_tokens, self.partial, self.full
    )
  }
}
