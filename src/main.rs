use hanuman_web::config;
use hanuman_web::gateway::{app, GatewayState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up HANUMAN_API_BASE_URL, BACKEND_API_TOKEN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    tracing::info!("Starting HanumanCars gateway in {:?} mode", config.environment);
    tracing::info!(
        "Serving {} against backend {}",
        config.server.static_root.display(),
        config.backend.base_url
    );
    if config.backend.service_token.is_none() {
        tracing::warn!("BACKEND_API_TOKEN not set; owner proxy routes will answer 503");
    }

    let port = config.server.port;
    let state = GatewayState::new(config)?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("HanumanCars gateway listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
