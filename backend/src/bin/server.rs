//! Timetable HTTP Server Binary
//!
//! Main entry point for the timetable REST API server. Loads configuration,
//! initializes the repository and generator, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # In-memory storage, offline generator (fallback timetables only)
//! cargo run --bin timetable-server
//!
//! # File storage and an HTTP generator
//! REPOSITORY_TYPE=file TIMETABLE_DATA_DIR=./data \
//!   GENERATOR_ENDPOINT=http://localhost:9000/generate \
//!   cargo run --bin timetable-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: `local` or `file` (default: local)
//! - `TIMETABLE_DATA_DIR`: Data directory for the file repository
//! - `GENERATOR_ENDPOINT`: Enables the HTTP generator at this URL
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use timetable_rust::config::AppConfig;
use timetable_rust::db::RepositoryFactory;
use timetable_rust::http::{create_router, AppState};
use timetable_rust::services::TimetableService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting timetable HTTP server");

    let config = AppConfig::load()?;

    let repository = RepositoryFactory::from_settings(&config.repository)?;
    info!(
        "Repository initialized ({})",
        config.repository.repo_type
    );

    let generator = config.generator.build()?;
    info!("Using {} generator", generator.name());

    let service = TimetableService::new(repository, generator)
        .with_params(config.generation_params())
        .with_timeout(config.generator.timeout());

    let app = create_router(AppState::new(service));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
