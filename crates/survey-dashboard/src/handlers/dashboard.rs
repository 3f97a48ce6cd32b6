//! `GET /` — the HTML dashboard.

use axum::{
  extract::{Query, State},
  response::Html,
};
use survey_core::store::{ResponseSource, SnapshotStore};

use crate::{
  AppState,
  controller::{DashboardQuery, build_view},
  error::Error,
  render,
};

pub async fn handler<S, F>(
  State(state): State<AppState<S, F>>,
  Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, Error>
where
  S: SnapshotStore + 'static,
  F: ResponseSource + 'static,
{
  let view = build_view(&state.refresher, &state.settings, &query).await?;
  Ok(Html(render::page(&state.settings, &view)))
}
