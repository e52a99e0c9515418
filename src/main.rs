use pickleball_portal::config::{self, Environment, PortalConfig};
use pickleball_portal::handlers;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up PORTAL_* settings
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Validate configuration once; a bad base URL or route path stops startup here
    let config = config::init(PortalConfig::from_env()?)?;
    tracing::info!("Starting Pickleball Portal in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("PORTAL_JWT_SECRET must be set outside development");
    }
    if config.environment == Environment::Development {
        tracing::warn!("using development JWT secret; do not expose this gateway publicly");
    }

    let app = handlers::app(config);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Pickleball Portal listening on http://{}", bind_addr);
    tracing::info!("API requests compose against {}", config.api.base());

    axum::serve(listener, app).await?;
    Ok(())
}
