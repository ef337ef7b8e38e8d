//! Incubator HTTP Server Binary
//!
//! Main entry point for the incubator REST API server.
//! It initializes the repository, sets up the HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # In-memory repository (default)
//! cargo run --bin incubator-server
//!
//! # JSON document on disk
//! REPOSITORY_TYPE=json DATA_FILE=data/incubator.json cargo run --bin incubator-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 5000)
//! - `REPOSITORY_TYPE`: `local` or `json` (default: json when `DATA_FILE` is set)
//! - `DATA_FILE`: JSON store path (default: data/incubator.json)
//! - `REPOSITORY_CONFIG`: path to a `repository.toml`, overrides the two above
//! - `RUST_LOG`: Log filter directives, e.g. `info,magic_incubator=debug` (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use magic_incubator::db::RepositoryFactory;
use magic_incubator::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting incubator HTTP server");

    let repository = match env::var("REPOSITORY_CONFIG") {
        Ok(path) => RepositoryFactory::from_config_file(&path).await?,
        Err(_) => RepositoryFactory::from_env().await?,
    };
    info!("Repository initialized successfully");

    let state = AppState::new(repository);
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
