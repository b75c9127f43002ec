use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::tmdb::TmdbMovie;

/// Kind of artwork served by the TMDb image CDN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Poster,
    Backdrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Small,
    Medium,
    Large,
    Original,
}

impl ImageKind {
    /// CDN size code for this kind of image
    pub fn size_code(self, size: ImageSize) -> &'static str {
        match (self, size) {
            (ImageKind::Poster, ImageSize::Small) => "w185",
            (ImageKind::Poster, ImageSize::Medium) => "w342",
            (ImageKind::Poster, ImageSize::Large) => "w500",
            (ImageKind::Backdrop, ImageSize::Small) => "w300",
            (ImageKind::Backdrop, ImageSize::Medium) => "w780",
            (ImageKind::Backdrop, ImageSize::Large) => "w1280",
            (_, ImageSize::Original) => "original",
        }
    }
}

/// Absolute URLs of one image at every supported size
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageVariants {
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
    pub original: Option<String>,
}

impl ImageVariants {
    /// Builds every size variant from a provider-relative path such as
    /// `/rhIRbceoE9lR4veEXuwCC2wARtG.jpg`. Without a path every variant is `None`.
    pub fn from_path(base_url: &str, kind: ImageKind, path: Option<&str>) -> Self {
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            return Self::default();
        };

        let url = |size| {
            Some(format!(
                "{}/{}{}",
                base_url.trim_end_matches('/'),
                kind.size_code(size),
                path
            ))
        };

        Self {
            small: url(ImageSize::Small),
            medium: url(ImageSize::Medium),
            large: url(ImageSize::Large),
            original: url(ImageSize::Original),
        }
    }
}

/// Metadata attached to a backend movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentRecord {
    /// TMDb movie id
    pub external_id: i64,
    pub title: String,
    pub original_title: String,
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Average vote on a 0 to 10 scale
    pub rating_average: Option<f64>,
    pub rating_count: Option<u64>,
    pub popularity: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    pub poster: ImageVariants,
    pub backdrop: ImageVariants,
}

impl EnrichmentRecord {
    pub fn from_tmdb(movie: TmdbMovie, image_base_url: &str) -> Self {
        let poster =
            ImageVariants::from_path(image_base_url, ImageKind::Poster, movie.poster_path.as_deref());
        let backdrop = ImageVariants::from_path(
            image_base_url,
            ImageKind::Backdrop,
            movie.backdrop_path.as_deref(),
        );

        let original_title = movie
            .original_title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| movie.title.clone());

        Self {
            external_id: movie.id,
            title: movie.title,
            original_title,
            overview: movie.overview.filter(|o| !o.trim().is_empty()),
            release_date: movie
                .release_date
                .as_deref()
                .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()),
            rating_average: movie.vote_average.filter(|v| (0.0..=10.0).contains(v)),
            rating_count: movie.vote_count,
            popularity: movie.popularity.filter(|p| *p >= 0.0),
            genre_ids: movie.genre_ids,
            poster,
            backdrop,
        }
    }
}
