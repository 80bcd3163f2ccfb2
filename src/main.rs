use anyhow::Context;
use tracing_subscriber::EnvFilter;

use movie_recommender::api::{create_router, AppState};
use movie_recommender::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_recommender=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Catalog problems are fatal here rather than on the first request.
    let state = AppState::from_config(&config).context("Failed to initialise application state")?;

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
