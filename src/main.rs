use postal_waste_api::{
    app::{app, AppState},
    config::config,
    database::DatabaseManager,
    is_development,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("postal_waste_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config().clone();
    tracing::info!("Starting Postal Waste API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }
    if is_development!() {
        tracing::warn!("Development mode: permissive CORS and a built-in JWT secret");
    }

    let store = DatabaseManager::open_store(&config.database).await?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Postal Waste API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(store, config))).await?;
    Ok(())
}
