use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use moviemate_api::api::{create_router, AppState};
use moviemate_api::config::Config;

// ============================================================================
// Fake recommendation backend
// ============================================================================

fn backend_router() -> Router {
    Router::new()
        .route(
            "/recommend/:user_id",
            get(|Path(user_id): Path<i64>| async move {
                Json(json!([
                    {"movieId": 1, "title": "Toy Story (1995)", "genres": "Animation|Children's|Comedy", "predicted_rating": 4.6 + user_id as f64 / 100.0},
                    {"movieId": 95, "title": "Broken Arrow (1996)", "genres": "Action|Thriller", "predicted_rating": 4.1},
                    {"movieId": 5000, "title": "Unknown Film (1901)", "genres": "(no genres listed)", "predicted_rating": 3.9}
                ]))
            }),
        )
        .route(
            "/similar/:movie_id",
            get(|| async {
                Json(json!([
                    {"movieId": 1, "title": "Toy Story (1995)", "genres": "Animation|Comedy", "similarity": 0.93}
                ]))
            }),
        )
        .route(
            "/movies/search/:query",
            get(|Path(query): Path<String>| async move {
                if query.to_lowercase().contains("toy") {
                    Json(json!([{"movieId": 1, "title": "Toy Story (1995)", "genres": "Animation|Comedy"}]))
                } else {
                    Json(json!([]))
                }
            }),
        )
        .route(
            "/movies/:movie_id",
            get(|Path(movie_id): Path<i64>| async move {
                if movie_id == 1 {
                    Ok(Json(json!({"movieId": 1, "title": "Toy Story (1995)", "genres": "Animation|Comedy"})))
                } else {
                    Err((StatusCode::NOT_FOUND, format!("电影ID {} 不存在", movie_id)))
                }
            }),
        )
        .route(
            "/predict",
            get(|Query(params): Query<HashMap<String, i64>>| async move {
                Json(json!({
                    "userId": params["user_id"],
                    "movieId": params["movie_id"],
                    "title": "Toy Story (1995)",
                    "predicted_rating": 4.2
                }))
            }),
        )
        .route(
            "/stats",
            get(|| async {
                Json(json!({
                    "total_users": 610,
                    "total_movies": 9724,
                    "model_components": 50,
                    "global_mean_rating": 3.5
                }))
            }),
        )
}

// ============================================================================
// Fake TMDb
// ============================================================================

#[derive(Default)]
struct FakeTmdb {
    search_hits: AtomicUsize,
    last_search: Mutex<HashMap<String, String>>,
}

fn tmdb_router(fake: Arc<FakeTmdb>) -> Router {
    Router::new()
        .route("/search/movie", get(tmdb_search))
        .route("/movie/popular", get(|| async {
            Json(json!({"page": 1, "results": [
                {"id": 550, "title": "搏击俱乐部", "original_title": "Fight Club", "poster_path": "/fc.jpg"}
            ]}))
        }))
        .route("/movie/:tmdb_id", get(|Path(tmdb_id): Path<i64>| async move {
            if tmdb_id != 862 {
                return Err((StatusCode::NOT_FOUND, "The resource you requested could not be found."));
            }
            Ok(Json(json!({
                "id": 862,
                "title": "玩具总动员",
                "original_title": "Toy Story",
                "tagline": "The adventure takes off!",
                "runtime": 81,
                "genres": [{"id": 16, "name": "动画"}],
                "credits": {"cast": [{"id": 31, "name": "Tom Hanks", "character": "Woody"}], "crew": []},
                "videos": {"results": [{"key": "v1", "name": "Trailer", "site": "YouTube", "type": "Trailer"}]},
                "similar": {"results": []}
            })))
        }))
        .route("/genre/movie/list", get(|| async {
            Json(json!({"genres": [{"id": 28, "name": "动作"}, {"id": 16, "name": "动画"}]}))
        }))
        .with_state(fake)
}

async fn tmdb_search(
    State(fake): State<Arc<FakeTmdb>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    fake.search_hits.fetch_add(1, Ordering::SeqCst);
    *fake.last_search.lock().unwrap() = params.clone();

    match params.get("query").map(String::as_str) {
        Some("Toy Story") => Ok(Json(json!({
            "page": 1,
            "results": [
                {
                    "id": 862,
                    "title": "玩具总动员",
                    "original_title": "Toy Story",
                    "overview": "胡迪是一个牛仔玩偶。",
                    "release_date": "1995-10-30",
                    "vote_average": 7.97,
                    "vote_count": 18253,
                    "popularity": 98.4,
                    "poster_path": "/toy.jpg",
                    "backdrop_path": null
                },
                {"id": 863, "title": "玩具总动员2", "original_title": "Toy Story 2"}
            ]
        }))),
        Some("Broken Arrow") => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Ok(Json(json!({"page": 1, "results": []}))),
    }
}

// ============================================================================
// Harness
// ============================================================================

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn create_test_server() -> (TestServer, Arc<FakeTmdb>) {
    let fake = Arc::new(FakeTmdb::default());
    let backend_url = spawn(backend_router()).await;
    let tmdb_url = spawn(tmdb_router(fake.clone())).await;

    let config = Config {
        recommender_api_url: backend_url,
        tmdb_api_url: tmdb_url,
        tmdb_api_key: Some("test_key".to_string()),
        enrichment_batch_delay_ms: 10,
        ..Config::default()
    };

    let state = AppState::from_config(&config).unwrap();
    (TestServer::new(create_router(state)).unwrap(), fake)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_recommendations_are_enriched() {
    let (server, fake) = create_test_server().await;

    let response = server.get("/api/v1/recommend/1").await;
    response.assert_status_ok();
    let items: Vec<Value> = response.json();

    assert_eq!(items.len(), 3);

    let toy_story = &items[0];
    assert_eq!(toy_story["movieId"], 1);
    assert_eq!(toy_story["genres"], json!(["Animation", "Children's", "Comedy"]));
    assert!(toy_story["predicted_rating"].as_f64().unwrap() > 4.6);
    assert_eq!(toy_story["metadata"]["external_id"], 862);
    assert_eq!(toy_story["metadata"]["original_title"], "Toy Story");
    assert_eq!(toy_story["metadata"]["release_date"], "1995-10-30");
    assert_eq!(
        toy_story["metadata"]["poster"]["medium"],
        "https://image.tmdb.org/t/p/w342/toy.jpg"
    );
    assert!(toy_story["metadata"]["backdrop"]["small"].is_null());

    // Provider failure and empty result both degrade to null metadata
    assert_eq!(items[1]["movieId"], 95);
    assert!(items[1]["metadata"].is_null());
    assert_eq!(items[2]["genres"], json!([]));
    assert!(items[2]["metadata"].is_null());

    assert_eq!(fake.search_hits.load(Ordering::SeqCst), 3);

    // Second request is served entirely from the cache, failures included
    server.get("/api/v1/recommend/1").await.assert_status_ok();
    assert_eq!(fake.search_hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_search_query_carries_year_and_key() {
    let (server, fake) = create_test_server().await;

    let response = server
        .get("/api/v1/metadata/search")
        .add_query_param("title", "Toy Story (1995)")
        .await;
    response.assert_status_ok();
    let record: Value = response.json();
    assert_eq!(record["title"], "玩具总动员");

    let params = fake.last_search.lock().unwrap().clone();
    assert_eq!(params["query"], "Toy Story");
    assert_eq!(params["year"], "1995");
    assert_eq!(params["api_key"], "test_key");
    assert_eq!(params["language"], "zh-CN");
    assert_eq!(params["include_adult"], "false");
}

#[tokio::test]
async fn test_metadata_search_without_match_returns_null() {
    let (server, fake) = create_test_server().await;

    for _ in 0..2 {
        let response = server
            .get("/api/v1/metadata/search")
            .add_query_param("title", "Heat")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body.is_null());
    }

    assert_eq!(fake.search_hits.load(Ordering::SeqCst), 1);
    assert!(!fake.last_search.lock().unwrap().contains_key("year"));
}

#[tokio::test]
async fn test_metadata_search_rejects_blank_title() {
    let (server, _) = create_test_server().await;
    let response = server
        .get("/api/v1/metadata/search")
        .add_query_param("title", "  ")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_movie_uses_single_item_path() {
    let (server, fake) = create_test_server().await;

    let response = server.get("/api/v1/movies/1").await;
    response.assert_status_ok();
    let movie: Value = response.json();
    assert_eq!(movie["title"], "Toy Story (1995)");
    assert_eq!(movie["metadata"]["external_id"], 862);

    server.get("/api/v1/movies/1").await.assert_status_ok();
    assert_eq!(fake.search_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_movie_is_not_found() {
    let (server, _) = create_test_server().await;
    let response = server.get("/api/v1/movies/999").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn test_search_and_similar_are_enriched() {
    let (server, _) = create_test_server().await;

    let response = server.get("/api/v1/movies/search/toy").await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["metadata"]["external_id"], 862);

    let response = server.get("/api/v1/similar/1").add_query_param("top_k", 3).await;
    response.assert_status_ok();
    let similar: Vec<Value> = response.json();
    assert_eq!(similar[0]["similarity"], 0.93);
    assert_eq!(similar[0]["metadata"]["external_id"], 862);
}

#[tokio::test]
async fn test_predict_passes_through() {
    let (server, _) = create_test_server().await;

    let response = server
        .get("/api/v1/predict")
        .add_query_param("user_id", 7)
        .add_query_param("movie_id", 1)
        .await;
    response.assert_status_ok();
    let prediction: Value = response.json();
    assert_eq!(prediction["userId"], 7);
    assert_eq!(prediction["movieId"], 1);
    assert_eq!(prediction["predicted_rating"], 4.2);
}

#[tokio::test]
async fn test_stats_report_cache_and_clear_resets_it() {
    let (server, fake) = create_test_server().await;

    server.get("/api/v1/recommend/1").await.assert_status_ok();

    let stats: Value = server.get("/api/v1/stats").await.json();
    assert_eq!(stats["total_movies"], 9724);
    assert_eq!(stats["enrichment_cache"]["entries"], 3);
    assert_eq!(stats["enrichment_cache"]["capacity"], 100);

    server
        .delete("/api/v1/metadata/cache")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stats: Value = server.get("/api/v1/stats").await.json();
    assert_eq!(stats["enrichment_cache"]["entries"], 0);

    server.get("/api/v1/recommend/1").await.assert_status_ok();
    assert_eq!(fake.search_hits.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_metadata_details_popular_and_genres() {
    let (server, _) = create_test_server().await;

    let response = server.get("/api/v1/metadata/movies/862").await;
    response.assert_status_ok();
    let details: Value = response.json();
    assert_eq!(details["external_id"], 862);
    assert_eq!(details["tagline"], "The adventure takes off!");
    assert_eq!(details["cast"][0]["name"], "Tom Hanks");
    assert_eq!(details["trailers"][0]["key"], "v1");

    server
        .get("/api/v1/metadata/movies/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let popular: Vec<Value> = server.get("/api/v1/metadata/popular").await.json();
    assert_eq!(popular[0]["original_title"], "Fight Club");
    assert_eq!(
        popular[0]["poster"]["small"],
        "https://image.tmdb.org/t/p/w185/fc.jpg"
    );

    let genres: Vec<Value> = server.get("/api/v1/metadata/genres").await.json();
    assert_eq!(genres.len(), 2);
    assert_eq!(genres[1]["name"], "动画");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let (server, _) = create_test_server().await;

    let response = server.get("/health").await;
    let request_id = response.header("x-request-id");
    assert!(Uuid::parse_str(request_id.to_str().unwrap()).is_ok());

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("ui-trace-42"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "ui-trace-42");
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    let config = Config {
        recommender_api_url: "http://127.0.0.1:9".to_string(),
        ..Config::default()
    };
    let state = AppState::from_config(&config).unwrap();
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server.get("/api/v1/stats").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
}
