//! `POST /refresh` — the "Update database" button.
//!
//! Requests an on-demand refresh and redirects back to the dashboard with
//! the same filters. A rate-limited or failed refresh is not reported to the
//! user; the page simply shows the existing snapshot.

use axum::{
  Form,
  extract::State,
  response::Redirect,
};
use survey_core::store::{ResponseSource, SnapshotStore};

use crate::{
  AppState,
  controller::{DashboardQuery, filter_query},
  refresh::RefreshOutcome,
};

pub async fn handler<S, F>(
  State(state): State<AppState<S, F>>,
  Form(query): Form<DashboardQuery>,
) -> Redirect
where
  S: SnapshotStore + 'static,
  F: ResponseSource + 'static,
{
  match state.refresher.request_refresh().await {
    Ok(RefreshOutcome::Refreshed { records }) => {
      tracing::info!("on-demand refresh loaded {records} responses");
    }
    Ok(RefreshOutcome::Skipped { retry_in }) => {
      tracing::debug!("on-demand refresh skipped, retry in {retry_in:?}");
    }
    Err(e) => tracing::warn!("on-demand refresh failed: {e}"),
  }

  let cutoff = query.cutoff(&state.settings);
  Redirect::to(&format!("/?{}", filter_query(&cutoff, query.completed_only())))
}
