//! daybookd — the Daybook journal server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, arms the daily reminder, and serves the JSON API
//! over HTTP. A failed schema migration halts startup.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::NaiveTime;
use clap::Parser;
use daybook_engine::{Journal, LogNotifier, SystemClock, TokioJobHost};
use daybook_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `config.toml` with `DAYBOOK_`
/// environment overrides.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:            String,
  #[serde(default = "default_port")]
  port:            u16,
  #[serde(default = "default_store_path")]
  store_path:      PathBuf,
  /// Local wall-clock hour the daily reminder targets.
  #[serde(default = "default_reminder_hour")]
  reminder_hour:   u32,
  #[serde(default)]
  reminder_minute: u32,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 7670 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.daybook/journal.db") }

fn default_reminder_hour() -> u32 { 21 }

#[derive(Parser)]
#[command(author, version, about = "Daybook journal server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

// ─── Main ────────────────────────────────────────────────────────────────────

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
    .add_source(config::Environment::with_prefix("DAYBOOK"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let reminder_time =
    NaiveTime::from_hms_opt(server_cfg.reminder_hour, server_cfg.reminder_minute, 0)
      .context("reminder_hour/reminder_minute out of range")?;

  // Expand `~` in store path and make sure its directory exists.
  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(dir) = store_path.parent() {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create {dir:?}"))?;
  }

  // Open the SQLite store. Migrations run here; a failure is fatal rather
  // than serving over an inconsistent schema.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Assemble the journal with the in-process platform collaborators.
  let journal = Arc::new(
    Journal::new(
      store,
      Arc::new(TokioJobHost::new()),
      Arc::new(LogNotifier),
      Arc::new(SystemClock),
    )
    .with_reminder_time(reminder_time),
  );

  journal.arm_reminder();
  tracing::info!(%reminder_time, "daily reminder armed");

  let app = axum::Router::new()
    .nest("/api", daybook_api::api_router(journal.clone()))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      tokio::signal::ctrl_c().await.ok();
    })
    .await
    .context("server error")?;

  // Background jobs are safe to cancel mid-pass: every write is idempotent.
  journal.shutdown();

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
