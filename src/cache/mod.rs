use std::fmt::Display;
use std::sync::Arc;

use crate::models::{normalize, EnrichmentRecord, NormalizedTitle};

mod fifo;

pub use fifo::FifoCache;

/// Default number of titles kept by the enrichment cache
pub const DEFAULT_CAPACITY: usize = 100;

/// Enrichment cache key: the normalized search title, lowercased
///
/// `"Toy Story (1995)"`, `"toy story"` and `" Toy Story "` share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_title(raw_title: &str) -> Self {
        Self::from(&normalize(raw_title))
    }
}

impl From<&NormalizedTitle> for CacheKey {
    fn from(title: &NormalizedTitle) -> Self {
        Self(title.search_title.to_lowercase())
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a finished metadata lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CachedEnrichment {
    Found(Arc<EnrichmentRecord>),
    /// The provider had no match; cached so the title is not queried again
    NotFound,
}

impl CachedEnrichment {
    pub fn record(&self) -> Option<Arc<EnrichmentRecord>> {
        match self {
            CachedEnrichment::Found(record) => Some(Arc::clone(record)),
            CachedEnrichment::NotFound => None,
        }
    }
}

impl From<Option<EnrichmentRecord>> for CachedEnrichment {
    fn from(record: Option<EnrichmentRecord>) -> Self {
        match record {
            Some(record) => CachedEnrichment::Found(Arc::new(record)),
            None => CachedEnrichment::NotFound,
        }
    }
}

pub type EnrichmentCache = FifoCache<CacheKey, CachedEnrichment>;
