use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OnceCell, RwLock};

use crate::{
    cache::{CacheKey, CachedEnrichment, EnrichmentCache},
    config::Config,
    models::{CacheStats, Enriched, EnrichmentRecord, HasMovie, Movie, MovieId},
    services::providers::MetadataProvider,
};

/// Enrichment results for a batch, keyed by backend movie id
///
/// Movies whose lookup found nothing (or failed) have no entry.
pub type Enrichments = HashMap<MovieId, Arc<EnrichmentRecord>>;

/// Group sizing and pacing for batch enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub group_size: usize,
    pub group_delay: Duration,
}

impl BatchSettings {
    pub const DEFAULT_GROUP_SIZE: usize = 5;
    pub const DEFAULT_GROUP_DELAY: Duration = Duration::from_millis(250);

    /// A group size of zero is raised to one.
    pub fn new(group_size: usize, group_delay: Duration) -> Self {
        Self {
            group_size: group_size.max(1),
            group_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.enrichment_batch_size, config.batch_delay())
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GROUP_SIZE, Self::DEFAULT_GROUP_DELAY)
    }
}

type InFlight = HashMap<CacheKey, Arc<OnceCell<CachedEnrichment>>>;

/// A title still to be looked up, with every movie id that shares its key
struct PendingLookup {
    title: String,
    movie_ids: Vec<MovieId>,
}

/// Cache-backed, rate-paced metadata enrichment
///
/// Cheap to clone: clones share the provider, cache and in-flight map.
#[derive(Clone)]
pub struct EnrichmentService {
    provider: Arc<dyn MetadataProvider>,
    cache: Arc<RwLock<EnrichmentCache>>,
    in_flight: Arc<Mutex<InFlight>>,
    batch: BatchSettings,
}

impl EnrichmentService {
    pub fn new(provider: Arc<dyn MetadataProvider>, cache: EnrichmentCache, batch: BatchSettings) -> Self {
        Self {
            provider,
            cache: Arc::new(RwLock::new(cache)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            batch,
        }
    }

    /// Enriches a single title
    ///
    /// A cached outcome (including a cached "no match") is returned without
    /// network access. On a miss the provider is queried once, however many
    /// callers ask for the same key concurrently, and the outcome is cached
    /// unconditionally.
    pub async fn enrich_one(&self, raw_title: &str) -> Option<Arc<EnrichmentRecord>> {
        let key = CacheKey::for_title(raw_title);

        if let Some(cached) = self.cache.read().await.get(&key) {
            tracing::debug!(key = %key, "Enrichment cache hit");
            return cached.record();
        }

        let cell = {
            let mut in_flight = self.in_flight.lock().await;

            // A lookup may have completed between the read above and taking the lock
            if let Some(cached) = self.cache.read().await.get(&key) {
                return cached.record();
            }

            Arc::clone(in_flight.entry(key.clone()).or_default())
        };

        // Detached: the lookup completes and its in-flight entry is retired
        // even when this caller is dropped.
        let service = self.clone();
        let title = raw_title.to_string();
        let task = tokio::spawn({
            let (key, cell) = (key.clone(), Arc::clone(&cell));
            async move { service.resolve(key, cell, title).await }
        });

        match task.await {
            Ok(outcome) => outcome.record(),
            Err(e) => {
                tracing::error!(error = %e, title = %raw_title, "Enrichment lookup task failed");
                self.retire(&key, &cell).await;
                None
            }
        }
    }

    /// Runs (or joins) the shared lookup for `key` and caches its outcome
    async fn resolve(
        &self,
        key: CacheKey,
        cell: Arc<OnceCell<CachedEnrichment>>,
        raw_title: String,
    ) -> CachedEnrichment {
        let outcome = cell
            .get_or_init(|| async {
                tracing::debug!(key = %key, "Enrichment cache miss");
                let outcome = CachedEnrichment::from(self.provider.lookup(&raw_title).await);

                if let Some(evicted) = self.cache.write().await.set(key.clone(), outcome.clone()) {
                    tracing::debug!(evicted = %evicted, "Enrichment cache evicted oldest entry");
                }

                outcome
            })
            .await
            .clone();

        self.retire(&key, &cell).await;

        outcome
    }

    /// Drops the in-flight entry for `key` if it still points at `cell`
    async fn retire(&self, key: &CacheKey, cell: &Arc<OnceCell<CachedEnrichment>>) {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, cell))
        {
            in_flight.remove(key);
        }
    }

    /// Enriches a sequence of movies in paced groups
    ///
    /// Cached titles are answered up front and never count toward a group.
    /// Remaining titles are deduplicated by cache key, kept in input order and
    /// looked up `group_size` at a time: every lookup of a group runs
    /// concurrently, the group is awaited as a whole, and `group_delay` elapses
    /// before the next group starts. A failed lookup only affects its own movies.
    pub async fn enrich_all<'a, I>(&self, movies: I) -> Enrichments
    where
        I: IntoIterator<Item = &'a Movie>,
    {
        let movies: Vec<&Movie> = movies.into_iter().collect();
        let mut enrichments = Enrichments::new();
        let mut pending: Vec<PendingLookup> = Vec::new();
        let mut pending_index: HashMap<CacheKey, usize> = HashMap::new();
        let mut cache_hits = 0;

        {
            let cache = self.cache.read().await;
            for movie in movies {
                let key = CacheKey::for_title(&movie.title);

                if let Some(cached) = cache.get(&key) {
                    cache_hits += 1;
                    if let Some(record) = cached.record() {
                        enrichments.insert(movie.id, record);
                    }
                    continue;
                }

                match pending_index.get(&key) {
                    Some(&index) => pending[index].movie_ids.push(movie.id),
                    None => {
                        pending_index.insert(key, pending.len());
                        pending.push(PendingLookup {
                            title: movie.title.clone(),
                            movie_ids: vec![movie.id],
                        });
                    }
                }
            }
        }

        let groups: Vec<&[PendingLookup]> = pending.chunks(self.batch.group_size).collect();

        for (index, group) in groups.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.batch.group_delay).await;
            }

            let mut tasks = Vec::with_capacity(group.len());
            for lookup in group.iter() {
                let service = self.clone();
                let title = lookup.title.clone();
                tasks.push(tokio::spawn(async move { service.enrich_one(&title).await }));
            }

            for (lookup, task) in group.iter().zip(tasks) {
                match task.await {
                    Ok(Some(record)) => {
                        for movie_id in &lookup.movie_ids {
                            enrichments.insert(*movie_id, Arc::clone(&record));
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(error = %e, title = %lookup.title, "Enrichment task failed");
                    }
                }
            }
        }

        tracing::info!(
            cache_hits = cache_hits,
            lookups = pending.len(),
            groups = groups.len(),
            enriched = enrichments.len(),
            "Batch enrichment completed"
        );

        enrichments
    }

    /// Enriches backend items and pairs each with its metadata, keeping order
    pub async fn attach<T: HasMovie>(&self, items: Vec<T>) -> Vec<Enriched<T>> {
        let enrichments = self.enrich_all(items.iter().map(|item| item.movie())).await;

        items
            .into_iter()
            .map(|item| {
                let metadata = enrichments.get(&item.movie().id).cloned();
                Enriched { item, metadata }
            })
            .collect()
    }

    /// Drops every cached outcome
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        tracing::info!("Enrichment cache cleared");
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.read().await;
        CacheStats {
            entries: cache.len(),
            capacity: cache.capacity(),
        }
    }
}
