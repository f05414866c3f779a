use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use storefront_recs::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, PgCatalogStore},
    routes::{create_router, AppState},
    services::{GeminiClient, Recommender},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront_recs=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let catalog = PgCatalogStore::new(pool, cache, config.catalog_cache_ttl_secs);
    let model = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_api_url.clone(),
        config.gemini_model.clone(),
    );
    let recommender = Recommender::new(Arc::new(model)).with_timeout(config.model_timeout());

    let state = Arc::new(AppState::new(Arc::new(catalog), recommender));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %config.bind_address(),
        model = %config.gemini_model,
        "Storefront recommendation service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
