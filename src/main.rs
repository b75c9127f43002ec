use moviemate_api::api::{create_router, AppState};
use moviemate_api::config::Config;
use moviemate_api::services::MetadataProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("moviemate_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::from_config(&config)?;

    tracing::info!(
        backend = %config.recommender_api_url,
        metadata_provider = state.tmdb.name(),
        cache_capacity = config.enrichment_cache_capacity,
        batch_size = config.enrichment_batch_size,
        batch_delay_ms = config.enrichment_batch_delay_ms,
        "Enrichment gateway configured"
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
