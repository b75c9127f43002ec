use axum::{
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, REQUEST_ID_HEADER};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
                .layer(cors),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Recommendation backend, enriched
        .route("/recommend/:user_id", get(handlers::recommend))
        .route("/similar/:movie_id", get(handlers::similar))
        .route("/movies/search/:query", get(handlers::search_movies))
        .route("/movies/:movie_id", get(handlers::movie))
        .route("/predict", get(handlers::predict))
        .route("/stats", get(handlers::stats))
        // Metadata provider
        .route("/metadata/search", get(handlers::metadata_search))
        .route("/metadata/movies/:tmdb_id", get(handlers::metadata_details))
        .route("/metadata/popular", get(handlers::metadata_popular))
        .route("/metadata/genres", get(handlers::metadata_genres))
        .route("/metadata/cache", delete(handlers::clear_metadata_cache))
}
