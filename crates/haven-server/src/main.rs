//! # Haven Server
//!
//! Main binary: loads configuration, connects PostgreSQL and Redis, runs
//! migrations, wires up object storage, the mailer, and the chat assistant,
//! and serves the REST API.

use haven_api::{AppState, build_router};
use haven_assistant::AssistantClient;
use haven_db::{Database, mailer::Mailer, storage::StorageClient};
use std::net::SocketAddr;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = haven_common::config::init()?;

    // Initialize tracing (structured logging)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "haven=debug,tower_http=debug".into()),
        )
        .with_target(true)
        .init();

    tracing::info!("Starting Haven v{}", env!("CARGO_PKG_VERSION"));

    // Connect to databases
    let db = Database::connect(config).await?;

    // Run migrations
    db.migrate().await?;

    // === Object Storage (MinIO / S3) ===
    let storage = StorageClient::new(&config.storage)?;
    storage.ensure_bucket().await?;
    tracing::info!("Object storage ready (bucket: {})", config.storage.bucket);

    // === Outbound mail ===
    let mailer = Mailer::new(&config.mail)?;
    if mailer.is_log_only() {
        tracing::warn!("No mail endpoint configured — outbound mail goes to the log");
    }

    // === Chat assistant ===
    let assistant = AssistantClient::new(&config.assistant);
    if assistant.is_enabled() {
        tracing::info!("Chat assistant ready (model: {})", config.assistant.model);
    } else {
        tracing::warn!("No assistant API key configured — chat replies will fail");
    }

    // === OAuth HTTP client ===
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(concat!("Haven/", env!("CARGO_PKG_VERSION")))
        .build()?;

    // === REST API Server ===
    let state = AppState {
        db,
        storage,
        mailer,
        assistant,
        http,
    };
    let router = build_router(state);
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    tracing::info!("REST API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
