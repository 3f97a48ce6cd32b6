pub mod api;
pub mod dashboard;
pub mod refresh;

/// `GET /healthz`
pub async fn health() -> &'static str { "ok" }
