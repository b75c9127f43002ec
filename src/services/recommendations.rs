use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{BackendStats, Movie, MovieId, RatingPrediction, Recommendation, SimilarMovie},
};

/// Client for the collaborative-filtering recommendation backend
///
/// The backend owns the model; this client only forwards requests and decodes
/// its JSON. A 404 from the backend becomes `AppError::NotFound`, any other
/// error status becomes `AppError::ExternalApi`.
#[derive(Clone)]
pub struct RecommendationClient {
    http_client: HttpClient,
    api_url: String,
}

impl RecommendationClient {
    pub fn new(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http_client.get(format!("{}{}", self.api_url, path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Recommendation backend request failed");

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(AppError::NotFound(body));
            }
            return Err(AppError::ExternalApi(format!(
                "Recommendation backend returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Top-k personalized recommendations for a user
    pub async fn recommendations(&self, user_id: i64, top_k: u32) -> AppResult<Vec<Recommendation>> {
        let request = self
            .get(&format!("/recommend/{}", user_id))
            .query(&[("top_k", top_k)]);
        let recommendations: Vec<Recommendation> = self.send(request).await?;

        tracing::info!(
            user_id = user_id,
            results = recommendations.len(),
            "Recommendations fetched"
        );

        Ok(recommendations)
    }

    pub async fn predict_rating(&self, user_id: i64, movie_id: MovieId) -> AppResult<RatingPrediction> {
        let request = self
            .get("/predict")
            .query(&[("user_id", user_id), ("movie_id", movie_id)]);
        self.send(request).await
    }

    /// Movies closest to `movie_id` in the model's item space
    pub async fn similar_movies(&self, movie_id: MovieId, top_k: u32) -> AppResult<Vec<SimilarMovie>> {
        let request = self
            .get(&format!("/similar/{}", movie_id))
            .query(&[("top_k", top_k)]);
        self.send(request).await
    }

    /// Case-insensitive title search over the backend catalogue
    pub async fn search_movies(&self, query: &str, limit: u32) -> AppResult<Vec<Movie>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let mut url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| AppError::Internal(format!("Invalid backend URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Backend URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["movies", "search", query]);

        let request = self.http_client.get(url).query(&[("limit", limit)]);
        let movies: Vec<Movie> = self.send(request).await?;

        tracing::info!(query = %query, results = movies.len(), "Movie search completed");

        Ok(movies)
    }

    pub async fn movie(&self, movie_id: MovieId) -> AppResult<Movie> {
        self.send(self.get(&format!("/movies/{}", movie_id))).await
    }

    pub async fn stats(&self) -> AppResult<BackendStats> {
        self.send(self.get("/stats")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_joins_base_url() {
        let client = RecommendationClient::new(reqwest::Client::new(), "http://backend.test:8000/");
        let request = client.get("/stats").build().unwrap();
        assert_eq!(request.url().as_str(), "http://backend.test:8000/stats");
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let client = RecommendationClient::new(reqwest::Client::new(), "http://backend.test");
        let result = client.search_movies("   ", 10).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_client_error() {
        let client = RecommendationClient::new(reqwest::Client::new(), "http://127.0.0.1:9");
        let result = client.stats().await;
        assert!(matches!(result, Err(AppError::HttpClient(_))));
    }
}
