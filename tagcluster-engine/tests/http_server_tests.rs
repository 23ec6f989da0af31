//! HTTP Server & Routing Integration Tests

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tagcluster_engine::tags::{StaticTagProvider, TagFetchError, TagProvider};
use tagcluster_engine::{build_router, AppState, MatchOptions, TrackMatcher};

struct DownProvider;

#[async_trait]
impl TagProvider for DownProvider {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn get_tags(&self, _artist: &str, _title: &str) -> Result<Vec<String>, TagFetchError> {
        Err(TagFetchError::Api(503, "service unavailable".to_string()))
    }
}

fn state_with(provider: Arc<dyn TagProvider>) -> AppState {
    AppState::new(
        Some(Arc::new(TrackMatcher::new(provider))),
        MatchOptions::default(),
    )
}

fn test_app() -> Router {
    let provider = StaticTagProvider::new()
        .with_track("Miles Davis", "So What", ["jazz", "trumpet"])
        .with_track("John Coltrane", "Naima", ["jazz", "saxophone"])
        .with_track("Slayer", "Raining Blood", ["thrash metal", "metal"])
        .with_track("Metallica", "Battery", ["thrash metal", "metal"]);
    build_router(state_with(Arc::new(provider)))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_route_serves_banner() {
    let response = test_app().oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"tagcluster-engine");
}

#[tokio::test]
async fn test_health_endpoint() {
    // Given: Configured service
    // When: GET /health
    let response = test_app().oneshot(get("/health")).await.unwrap();

    // Then: Reports module identity
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "tagcluster-engine");
    assert!(json["version"].is_string());
    assert!(json["git_hash"].is_string());
    assert!(json["uptime_seconds"].is_u64());
    assert!(json.get("last_error").is_none());
}

#[tokio::test]
async fn test_health_degraded_without_provider() {
    let app = build_router(AppState::new(None, MatchOptions::default()));
    let response = app.oneshot(get("/health")).await.unwrap();

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
}

#[tokio::test]
async fn test_cluster_groups_tracks_by_genre() {
    // Given: Two jazz and two metal tracks
    let body = json!({
        "track_metadata": [
            { "name": "So What", "artist": "Miles Davis" },
            { "name": "Raining Blood", "artist": "Slayer" },
            { "name": "Naima", "artist": "John Coltrane" },
            { "name": "Battery", "artist": "Metallica" }
        ]
    });

    // When: POST /cluster
    let response = test_app().oneshot(post_json("/cluster", body)).await.unwrap();

    // Then: One cluster per genre
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let clusters = json["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 2);

    let mut genres: Vec<&str> = clusters.iter().map(|c| c["genre"].as_str().unwrap()).collect();
    genres.sort_unstable();
    assert_eq!(genres, vec!["jazz", "metal"]);

    let total: usize = clusters.iter().map(|c| c["tracks"].as_array().unwrap().len()).sum();
    assert_eq!(total, 4);

    let silhouette = json["silhouette_score"].as_f64().unwrap();
    assert!((-1.0..=1.0).contains(&silhouette));
    assert!(json["davies_bouldin"].is_number());
    assert!(json["calinski_harabasz"].is_number());
}

#[tokio::test]
async fn test_cluster_empty_track_list() {
    let response = test_app()
        .oneshot(post_json("/cluster", json!({ "track_metadata": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["clusters"], json!([]));
    assert!(json["silhouette_score"].is_null());
    assert!(json["davies_bouldin"].is_null());
    assert!(json["calinski_harabasz"].is_null());
}

#[tokio::test]
async fn test_cluster_missing_track_metadata() {
    let response = test_app()
        .oneshot(post_json("/cluster", json!({ "algorithm": "kmeans" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_cluster_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/cluster")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_cluster_unsupported_algorithm() {
    let body = json!({
        "algorithm": "dbscan",
        "track_metadata": [{ "name": "So What", "artist": "Miles Davis" }]
    });

    let response = test_app().oneshot(post_json("/cluster", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "UNSUPPORTED_ALGORITHM");
    assert!(json["error"]["message"].as_str().unwrap().contains("dbscan"));
}

#[tokio::test]
async fn test_cluster_out_of_range_threshold() {
    let body = json!({ "merge_threshold": 1.5, "track_metadata": [] });

    let response = test_app().oneshot(post_json("/cluster", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cluster_without_api_key() {
    // Given: Service started without a Last.fm key
    let state = AppState::new(None, MatchOptions::default());
    let app = build_router(state.clone());
    let body = json!({ "track_metadata": [{ "name": "So What", "artist": "Miles Davis" }] });

    // When: POST /cluster
    let response = app.oneshot(post_json("/cluster", body)).await.unwrap();

    // Then: Configuration error, recorded for /health
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "MISSING_CONFIGURATION");
    assert!(state.last_error.read().await.is_some());
}

#[tokio::test]
async fn test_cluster_survives_provider_outage() {
    let app = build_router(state_with(Arc::new(DownProvider)));
    let body = json!({
        "track_metadata": [
            { "name": "A", "artist": "x" },
            { "name": "B", "artist": "y" }
        ]
    });

    let response = app.oneshot(post_json("/cluster", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let clusters = json["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0]["genre"], "unclassified");
}

#[tokio::test]
async fn test_tags_lookup() {
    let response = test_app()
        .oneshot(get("/tags?artist=Slayer&track=Raining%20Blood"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["provider"], "static");
    assert_eq!(json["tags"], json!(["thrash metal", "metal"]));
}

#[tokio::test]
async fn test_tags_missing_parameter() {
    let response = test_app().oneshot(get("/tags?artist=Slayer")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tags_upstream_failure() {
    let state = state_with(Arc::new(DownProvider));
    let app = build_router(state.clone());

    let response = app.oneshot(get("/tags?artist=x&track=y")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
    assert!(state.last_error.read().await.is_some());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let response = test_app().oneshot(get("/nonexistent")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
