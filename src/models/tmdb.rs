use serde::{Deserialize, Serialize};

use super::enrichment::EnrichmentRecord;

const MAX_CAST: usize = 10;
const MAX_CREW: usize = 5;
const MAX_SIMILAR: usize = 6;

// ============================================================================
// TMDb API Types
// ============================================================================

/// Paged list wrapper used by the search, popular and similar endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbResults<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Movie entry as returned by `/search/movie` and list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbGenre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenreList {
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbCompany {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub origin_country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbCastMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbCrewMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbVideo {
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

/// Response of `/movie/{id}?append_to_response=credits,videos,similar`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub revenue: Option<u64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub production_companies: Vec<TmdbCompany>,
    #[serde(default)]
    pub credits: Option<TmdbCredits>,
    #[serde(default)]
    pub videos: Option<TmdbResults<TmdbVideo>>,
    #[serde(default)]
    pub similar: Option<TmdbResults<TmdbMovie>>,
}

// ============================================================================
// Detail View
// ============================================================================

/// Full metadata for a movie detail page
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub record: EnrichmentRecord,
    pub tagline: Option<String>,
    pub runtime: Option<u32>,
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
    pub genres: Vec<TmdbGenre>,
    pub production_companies: Vec<TmdbCompany>,
    pub cast: Vec<TmdbCastMember>,
    pub crew: Vec<TmdbCrewMember>,
    /// Trailer videos only
    pub trailers: Vec<TmdbVideo>,
    pub similar: Vec<EnrichmentRecord>,
}

impl MovieDetails {
    pub fn from_tmdb(details: TmdbMovieDetails, image_base_url: &str) -> Self {
        let credits = details.credits.unwrap_or_default();

        let trailers = details
            .videos
            .map(|videos| {
                videos
                    .results
                    .into_iter()
                    .filter(|video| video.video_type == "Trailer")
                    .collect()
            })
            .unwrap_or_default();

        let similar = details
            .similar
            .map(|similar| {
                similar
                    .results
                    .into_iter()
                    .take(MAX_SIMILAR)
                    .map(|movie| EnrichmentRecord::from_tmdb(movie, image_base_url))
                    .collect()
            })
            .unwrap_or_default();

        let summary = TmdbMovie {
            id: details.id,
            title: details.title,
            original_title: details.original_title,
            overview: details.overview,
            release_date: details.release_date,
            vote_average: details.vote_average,
            vote_count: details.vote_count,
            popularity: details.popularity,
            poster_path: details.poster_path,
            backdrop_path: details.backdrop_path,
            genre_ids: details.genres.iter().map(|genre| genre.id).collect(),
        };

        Self {
            record: EnrichmentRecord::from_tmdb(summary, image_base_url),
            tagline: details.tagline.filter(|t| !t.is_empty()),
            runtime: details.runtime,
            budget: details.budget,
            revenue: details.revenue,
            genres: details.genres,
            production_companies: details.production_companies,
            cast: credits.cast.into_iter().take(MAX_CAST).collect(),
            crew: credits.crew.into_iter().take(MAX_CREW).collect(),
            trailers,
            similar,
        }
    }
}
