//! TMDb (The Movie Database) metadata provider
//!
//! API Flow:
//! 1. Lookup: /search/movie → first ranked match becomes an `EnrichmentRecord`
//! 2. Details: /movie/{id}?append_to_response=credits,videos,similar
//! 3. Listings: /movie/popular and /genre/movie/list
//!
//! Authentication uses the v3 `api_key` query parameter, the v4 bearer read
//! token, or both, depending on what is configured. With neither, requests are
//! still sent and the remote side decides.
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        tmdb::{TmdbGenreList, TmdbMovie, TmdbMovieDetails, TmdbResults},
        normalize, EnrichmentRecord, MovieDetails, NormalizedTitle, TmdbGenre,
    },
    services::providers::MetadataProvider,
};
use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_url: String,
    image_url: String,
    api_key: Option<String>,
    read_token: Option<String>,
    language: String,
}

impl TmdbProvider {
    pub fn new(http_client: HttpClient, config: &Config) -> Self {
        if !config.has_tmdb_credentials() {
            tracing::warn!("No TMDb credentials configured, metadata requests will be unauthenticated");
        }

        Self {
            http_client,
            api_url: config.tmdb_api_url.trim_end_matches('/').to_string(),
            image_url: config.tmdb_image_url.trim_end_matches('/').to_string(),
            api_key: config.tmdb_api_key.clone(),
            read_token: config.tmdb_read_token.clone(),
            language: config.tmdb_language.clone(),
        }
    }

    /// Builds an authenticated GET request for a TMDb path
    fn request(&self, path: &str) -> RequestBuilder {
        let mut request = self
            .http_client
            .get(format!("{}{}", self.api_url, path))
            .query(&[("language", self.language.as_str())]);

        if let Some(api_key) = &self.api_key {
            request = request.query(&[("api_key", api_key.as_str())]);
        }

        if let Some(token) = &self.read_token {
            request = request.bearer_auth(token);
        }

        request
    }

    fn search_request(&self, title: &NormalizedTitle) -> RequestBuilder {
        let mut request = self.request("/search/movie").query(&[
            ("query", title.search_title.as_str()),
            ("include_adult", "false"),
        ]);

        if let Some(year) = &title.year {
            request = request.query(&[("year", year.as_str())]);
        }

        request
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(AppError::NotFound(format!("TMDb resource not found: {}", body)));
            }
            return Err(AppError::ExternalApi(format!(
                "TMDb API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Searches TMDb and returns the first ranked match, if any
    async fn search_movie(&self, title: &NormalizedTitle) -> AppResult<Option<TmdbMovie>> {
        let results: TmdbResults<TmdbMovie> = self.send(self.search_request(title)).await?;
        Ok(results.results.into_iter().next())
    }

    /// Fetches the detail view of one TMDb movie
    pub async fn movie_details(&self, tmdb_id: i64) -> AppResult<MovieDetails> {
        let request = self
            .request(&format!("/movie/{}", tmdb_id))
            .query(&[("append_to_response", "credits,videos,similar")]);

        let details: TmdbMovieDetails = self.send(request).await?;

        tracing::info!(tmdb_id = tmdb_id, provider = "tmdb", "Movie details fetched");

        Ok(MovieDetails::from_tmdb(details, &self.image_url))
    }

    /// Fetches one page of TMDb's popular movies
    pub async fn popular_movies(&self, page: u32) -> AppResult<Vec<EnrichmentRecord>> {
        if page == 0 {
            return Err(AppError::InvalidInput("Page numbers start at 1".to_string()));
        }

        let request = self
            .request("/movie/popular")
            .query(&[("page", page.to_string())]);
        let results: TmdbResults<TmdbMovie> = self.send(request).await?;

        Ok(results
            .results
            .into_iter()
            .map(|movie| EnrichmentRecord::from_tmdb(movie, &self.image_url))
            .collect())
    }

    pub async fn genres(&self) -> AppResult<Vec<TmdbGenre>> {
        let list: TmdbGenreList = self.send(self.request("/genre/movie/list")).await?;
        Ok(list.genres)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn lookup(&self, raw_title: &str) -> Option<EnrichmentRecord> {
        let title = normalize(raw_title);

        match self.search_movie(&title).await {
            Ok(Some(movie)) => {
                tracing::debug!(
                    title = %raw_title,
                    tmdb_id = movie.id,
                    provider = "tmdb",
                    "Metadata lookup matched"
                );
                Some(EnrichmentRecord::from_tmdb(movie, &self.image_url))
            }
            Ok(None) => {
                tracing::debug!(
                    title = %raw_title,
                    search_title = %title.search_title,
                    year = ?title.year,
                    provider = "tmdb",
                    "Metadata lookup found no match"
                );
                None
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    title = %raw_title,
                    provider = "tmdb",
                    "Metadata lookup failed"
                );
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
