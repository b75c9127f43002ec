use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

pub mod enrichment;
pub mod title;
pub mod tmdb;

pub use enrichment::{EnrichmentRecord, ImageKind, ImageSize, ImageVariants};
pub use title::{normalize, NormalizedTitle};
pub use tmdb::{MovieDetails, TmdbGenre};

/// Identifier assigned to a movie by the recommendation backend
pub type MovieId = i64;

/// MovieLens placeholder for movies without genre tags
const NO_GENRES_SENTINEL: &str = "(no genres listed)";

// ============================================================================
// Recommendation Backend Types
// ============================================================================

/// A movie as returned by the recommendation backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    #[serde(rename = "movieId")]
    pub id: MovieId,
    pub title: String,
    /// Ordered genre tags. The backend sends them pipe-joined.
    #[serde(default, deserialize_with = "deserialize_genres")]
    pub genres: Vec<String>,
}

/// One entry of a personalized recommendation list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(flatten)]
    pub movie: Movie,
    pub predicted_rating: f64,
}

/// One entry of an item-to-item similarity list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarMovie {
    #[serde(flatten)]
    pub movie: Movie,
    pub similarity: f64,
}

/// Predicted rating of one movie for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingPrediction {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub title: String,
    pub predicted_rating: f64,
}

/// Aggregate statistics of the trained recommendation model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendStats {
    pub total_users: u64,
    pub total_movies: u64,
    pub model_components: u32,
    pub global_mean_rating: f64,
}

/// Access to the movie record embedded in a backend response item
pub trait HasMovie {
    fn movie(&self) -> &Movie;
}

impl HasMovie for Movie {
    fn movie(&self) -> &Movie {
        self
    }
}

impl HasMovie for Recommendation {
    fn movie(&self) -> &Movie {
        &self.movie
    }
}

impl HasMovie for SimilarMovie {
    fn movie(&self) -> &Movie {
        &self.movie
    }
}

/// Splits a pipe-joined MovieLens genre string into tags
pub fn split_genres(joined: &str) -> Vec<String> {
    joined
        .split('|')
        .map(str::trim)
        .filter(|genre| !genre.is_empty() && *genre != NO_GENRES_SENTINEL)
        .map(String::from)
        .collect()
}

fn deserialize_genres<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Genres {
        Joined(String),
        Tags(Vec<String>),
    }

    Ok(match Genres::deserialize(deserializer)? {
        Genres::Joined(joined) => split_genres(&joined),
        Genres::Tags(tags) => tags,
    })
}

// ============================================================================
// Gateway Response Types
// ============================================================================

/// A backend item with its TMDb metadata attached
///
/// `metadata` is `null` both when the lookup found nothing and when no lookup
/// result is available, so clients render the two cases the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enriched<T> {
    #[serde(flatten)]
    pub item: T,
    pub metadata: Option<Arc<EnrichmentRecord>>,
}

/// Cache occupancy reported next to the backend statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayStats {
    #[serde(flatten)]
    pub backend: BackendStats,
    pub enrichment_cache: CacheStats,
}
