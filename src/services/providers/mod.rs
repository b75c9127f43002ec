//! Movie metadata provider abstraction
//!
//! Provider-specific extras (details, popular lists, genres) live on the
//! concrete provider types.
use crate::models::EnrichmentRecord;

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
///
/// `lookup` is infallible by contract: transport failures, error statuses,
/// malformed bodies and empty result sets all come back as `None`, and are only
/// visible in the logs. Callers treat `None` as "no metadata for this title".
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Look up metadata for a raw display title such as `"Heat (1995)"`
    ///
    /// The provider normalizes the title itself and returns its first ranked
    /// match.
    async fn lookup(&self, raw_title: &str) -> Option<EnrichmentRecord>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
