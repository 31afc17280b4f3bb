use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use presswork_api::{app, AppState};
use presswork_catalog::QuoteEngine;
use presswork_core::QuoteService;
use presswork_store::{app_config::Config, load_seed, seed_repository, InMemoryProductRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presswork_api=debug,presswork_store=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Presswork API on port {}", config.server.port);

    let engine = QuoteEngine::new(config.pricing.tax_rate);
    let repo = Arc::new(InMemoryProductRepository::new(engine.clone()));

    match &config.catalog.seed_path {
        Some(path) => {
            let products = load_seed(path).context("Failed to load catalog seed")?;
            seed_repository(repo.as_ref(), products)
                .await
                .context("Failed to seed catalog")?;
        }
        None => tracing::warn!("No catalog.seed_path configured; starting with an empty catalog"),
    }

    let app_state = AppState::new(
        QuoteService::new(repo, engine),
        Duration::from_millis(config.pricing.quote_debounce_ms),
    );
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
