use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the recommendation backend
    #[serde(default = "default_recommender_api_url")]
    pub recommender_api_url: String,

    /// TMDb API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDb image CDN base URL
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// TMDb v3 API key, sent as the `api_key` query parameter
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDb v4 read access token, sent as a bearer header
    #[serde(default)]
    pub tmdb_read_token: Option<String>,

    /// Locale passed to TMDb for titles and overviews
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Maximum number of titles held by the enrichment cache
    #[serde(default = "default_cache_capacity")]
    pub enrichment_cache_capacity: usize,

    /// Number of metadata lookups issued concurrently per batch group
    #[serde(default = "default_batch_size")]
    pub enrichment_batch_size: usize,

    /// Pause between batch groups, in milliseconds
    #[serde(default = "default_batch_delay_ms")]
    pub enrichment_batch_delay_ms: u64,

    /// Transport timeout for outbound HTTP calls, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_recommender_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_tmdb_language() -> String {
    "zh-CN".to_string()
}

fn default_cache_capacity() -> usize {
    crate::cache::DEFAULT_CAPACITY
}

fn default_batch_size() -> usize {
    crate::services::BatchSettings::DEFAULT_GROUP_SIZE
}

fn default_batch_delay_ms() -> u64 {
    250
}

fn default_http_timeout_secs() -> u64 {
    15
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.enrichment_batch_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// True when at least one TMDb credential is configured
    pub fn has_tmdb_credentials(&self) -> bool {
        self.tmdb_api_key.is_some() || self.tmdb_read_token.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            recommender_api_url: default_recommender_api_url(),
            tmdb_api_url: default_tmdb_api_url(),
            tmdb_image_url: default_tmdb_image_url(),
            tmdb_api_key: None,
            tmdb_read_token: None,
            tmdb_language: default_tmdb_language(),
            enrichment_cache_capacity: default_cache_capacity(),
            enrichment_batch_size: default_batch_size(),
            enrichment_batch_delay_ms: default_batch_delay_ms(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}
