use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{
    Enriched, EnrichmentRecord, GatewayStats, Movie, MovieDetails, MovieId, RatingPrediction,
    Recommendation, SimilarMovie, TmdbGenre,
};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct TopKQuery {
    pub top_k: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    pub user_id: i64,
    pub movie_id: MovieId,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

const DEFAULT_RECOMMENDATIONS: u32 = 10;
const DEFAULT_SIMILAR: u32 = 5;
const DEFAULT_SEARCH_LIMIT: u32 = 10;

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Personalized recommendations with metadata attached
pub async fn recommend(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<TopKQuery>,
) -> AppResult<Json<Vec<Enriched<Recommendation>>>> {
    let top_k = params.top_k.unwrap_or(DEFAULT_RECOMMENDATIONS);
    let recommendations = state.backend.recommendations(user_id, top_k).await?;
    Ok(Json(state.enrichment.attach(recommendations).await))
}

pub async fn similar(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
    Query(params): Query<TopKQuery>,
) -> AppResult<Json<Vec<Enriched<SimilarMovie>>>> {
    let top_k = params.top_k.unwrap_or(DEFAULT_SIMILAR);
    let similar = state.backend.similar_movies(movie_id, top_k).await?;
    Ok(Json(state.enrichment.attach(similar).await))
}

pub async fn search_movies(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<Enriched<Movie>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let movies = state.backend.search_movies(&query, limit).await?;
    Ok(Json(state.enrichment.attach(movies).await))
}

/// One movie, enriched on demand through the single-item path
pub async fn movie(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<Enriched<Movie>>> {
    let movie = state.backend.movie(movie_id).await?;
    let metadata = state.enrichment.enrich_one(&movie.title).await;
    Ok(Json(Enriched {
        item: movie,
        metadata,
    }))
}

pub async fn predict(
    State(state): State<AppState>,
    Query(params): Query<PredictQuery>,
) -> AppResult<Json<RatingPrediction>> {
    let prediction = state
        .backend
        .predict_rating(params.user_id, params.movie_id)
        .await?;
    Ok(Json(prediction))
}

pub async fn stats(State(state): State<AppState>) -> AppResult<Json<GatewayStats>> {
    let backend = state.backend.stats().await?;
    let enrichment_cache = state.enrichment.cache_stats().await;
    Ok(Json(GatewayStats {
        backend,
        enrichment_cache,
    }))
}

/// Metadata for a free-form display title
///
/// Returns `null` when the provider has no match.
pub async fn metadata_search(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> AppResult<Json<Option<Arc<EnrichmentRecord>>>> {
    if params.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }
    Ok(Json(state.enrichment.enrich_one(&params.title).await))
}

pub async fn metadata_details(
    State(state): State<AppState>,
    Path(tmdb_id): Path<i64>,
) -> AppResult<Json<MovieDetails>> {
    Ok(Json(state.tmdb.movie_details(tmdb_id).await?))
}

pub async fn metadata_popular(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<Vec<EnrichmentRecord>>> {
    Ok(Json(state.tmdb.popular_movies(params.page.unwrap_or(1)).await?))
}

pub async fn metadata_genres(State(state): State<AppState>) -> AppResult<Json<Vec<TmdbGenre>>> {
    Ok(Json(state.tmdb.genres().await?))
}

pub async fn clear_metadata_cache(State(state): State<AppState>) -> StatusCode {
    state.enrichment.clear_cache().await;
    StatusCode::NO_CONTENT
}
