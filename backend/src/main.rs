use tracing::info;
use tracing_subscriber::EnvFilter;

use secret_valentine_backend::config::ServerConfig;
use secret_valentine_backend::{build_router, initialize_backend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    info!("Starting Secret Valentine backend");

    let state = initialize_backend(&config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    info!("Listening on {}", config.http_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
