//! CMS backend server: loads settings, opens the store, registers controllers, serves.

use axum::Router;
use cms_backend::{app, register_all, DaoFactory, ServerConfig};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Loads `.env` too, so it must run before the log filter reads RUST_LOG.
    let config = ServerConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cms_backend=info")),
        )
        .init();

    tracing::info!(store = ?config.store, schema = %config.schema, "starting");

    let factory = DaoFactory::from_config(&config).await?;
    let resources = register_all(Router::new(), &factory).await?;
    let app = app(resources, config.body_limit_bytes);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
