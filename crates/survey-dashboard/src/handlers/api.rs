//! Handler for `GET /api/summary`.
//!
//! Accepts the same query parameters as the HTML dashboard and returns the
//! view as JSON, with an ETag for conditional requests.

use axum::{
  Json,
  extract::{Query, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use survey_core::store::{ResponseSource, SnapshotStore};

use crate::{
  AppState,
  controller::{DashboardQuery, build_view},
  error::Error,
  etag::{compute_etag, if_none_match},
};

pub async fn summary<S, F>(
  State(state): State<AppState<S, F>>,
  Query(query): Query<DashboardQuery>,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: SnapshotStore + 'static,
  F: ResponseSource + 'static,
{
  let view = build_view(&state.refresher, &state.settings, &query).await?;
  let etag = compute_etag(&view);

  let not_modified = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| if_none_match(v, &etag));

  let mut response = if not_modified {
    StatusCode::NOT_MODIFIED.into_response()
  } else {
    Json(view).into_response()
  };
  if let Ok(value) = HeaderValue::from_str(&etag) {
    response.headers_mut().insert(header::ETAG, value);
  }
  Ok(response)
}
