use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use manga_discovery_backend::api::{self, AppState};
use manga_discovery_backend::config::AppConfig;
use manga_discovery_backend::external::{ExternalApiClient, MangaDexClient};
use manga_discovery_backend::services::PreferenceStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Initialize catalog client
    let catalog = MangaDexClient::new(
        &config.api_base_url,
        &config.uploads_base_url,
        config.request_timeout,
    )?;
    let external_client = ExternalApiClient::new(Arc::new(catalog));

    // Load persisted preferences
    let preferences = PreferenceStore::load(Some(config.preferences_path.clone())).await?;

    let state = AppState::new(
        external_client,
        Arc::new(preferences),
        config.page_size,
        config.session_idle,
    );
    let app = api::router(state);

    let addr = config.socket_addr()?;
    tracing::info!("🚀 Server listening on {}", addr);
    tracing::info!("📚 Catalog API: {}", config.api_base_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
