use std::sync::Arc;

use crate::cache::EnrichmentCache;
use crate::config::Config;
use crate::services::{BatchSettings, EnrichmentService, RecommendationClient, TmdbProvider};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: RecommendationClient,
    pub tmdb: Arc<TmdbProvider>,
    pub enrichment: EnrichmentService,
}

impl AppState {
    /// Builds the HTTP clients, the enrichment cache and the pipeline from config
    ///
    /// The cache starts empty and lives as long as the process.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;

        let backend = RecommendationClient::new(http_client.clone(), &config.recommender_api_url);
        let tmdb = Arc::new(TmdbProvider::new(http_client, config));
        let enrichment = EnrichmentService::new(
            tmdb.clone(),
            EnrichmentCache::new(config.enrichment_cache_capacity),
            BatchSettings::from_config(config),
        );

        Ok(Self {
            backend,
            tmdb,
            enrichment,
        })
    }
}
