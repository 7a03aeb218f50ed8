//! shardrail server binary.
//!
//! Startup order: environment → metadata database (created on first
//! run) → control plane → shard connections → health monitor → HTTP.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use shardrail::config::{MetadataDbConfig, MONITOR_INTERVAL};
use shardrail::control::{spawn_monitor, ControlPlane};
use shardrail::http_server::HttpServer;
use shardrail::metadata::{self, PgMetadata};
use shardrail::observability::{EventBus, Logger};
use shardrail::router::RouterConfig;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        Logger::error("startup failed", &[("error", &err)]);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    // A missing .env file is fine; the variables may come from the
    // process environment.
    let _ = dotenvy::dotenv();

    let db_config = MetadataDbConfig::from_env().map_err(|err| err.to_string())?;

    let pool = metadata::connect(&db_config)
        .await
        .map_err(|err| err.to_string())?;
    Logger::info("metadata database ready", &[("database", &db_config.database)]);

    let store = Arc::new(PgMetadata::new(pool));
    let events = EventBus::default();
    let plane = Arc::new(ControlPlane::new(
        store,
        RouterConfig::default(),
        events,
    ));

    plane.init_connections().await;

    let shutdown = CancellationToken::new();
    let monitor = spawn_monitor(plane.clone(), MONITOR_INTERVAL, shutdown.clone());

    let server = HttpServer::new(plane.clone());

    let serve_token = shutdown.clone();
    let server_task = tokio::spawn(async move { server.start(serve_token).await });

    Logger::info("application startup successful", &[]);

    tokio::signal::ctrl_c()
        .await
        .map_err(|err| err.to_string())?;
    Logger::info("shutdown signal received", &[]);
    shutdown.cancel();

    let _ = monitor.await;
    match server_task.await {
        Ok(result) => result.map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    }
}
