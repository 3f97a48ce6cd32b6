//! survey-dashboard server binary.
//!
//! Reads `dashboard.toml` (or the path given with `--config`) layered under
//! `DASHBOARD_*` environment variables, performs one mandatory refresh,
//! starts the background poller and serves the dashboard over HTTP.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `DASHBOARD_SURVEY__PASSWORD`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use survey_dashboard::{
  AppState, DashboardSettings, ServerConfig, refresh::Refresher,
};
use survey_limesurvey::LimeSurveyClient;
use survey_store_file::FileSnapshotStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Survey response dashboard")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "dashboard.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("DASHBOARD")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  tracing::debug!("configuration: {server_cfg:?}");

  let dashboard = DashboardSettings::from_config(&server_cfg)
    .context("invalid dashboard settings")?;

  let cache_path = server_cfg
    .cache_path
    .clone()
    .unwrap_or_else(FileSnapshotStore::default_path);
  let store = FileSnapshotStore::new(&cache_path);
  let source = LimeSurveyClient::new(server_cfg.survey.clone(), server_cfg.timezone)
    .context("failed to build LimeSurvey client")?;
  let refresher = Arc::new(Refresher::new(
    store,
    source,
    server_cfg.min_refresh_spacing(),
  ));

  // Never serve without a snapshot: an unreachable survey at startup is fatal.
  let records = refresher
    .refresh()
    .await
    .context("initial survey refresh failed")?;
  tracing::info!("cached {records} responses at {}", cache_path.display());

  refresher.clone().spawn_poller(server_cfg.refresh_interval());

  let state = AppState { refresher, settings: Arc::new(dashboard) };
  let app = survey_dashboard::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
