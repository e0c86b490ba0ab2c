//! Estimo API Server
//!
//! Main entry point for the estimation and quotation service.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estimo_api::{AppState, create_router};
use estimo_core::artifact::StorageArtifactGenerator;
use estimo_core::storage::StorageService;
use estimo_db::connect_with_config;
use estimo_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estimo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with_config(&config.database).await?;
    info!("Connected to database");

    let storage = StorageService::from_settings(&config.storage)?;
    info!(
        public_base_url = %config.storage.public_base_url(),
        "Artifact storage configured"
    );

    let state = AppState::new(
        db,
        config.finance.clone(),
        StorageArtifactGenerator::new(storage),
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
