use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use songrec::api::create_router;
use songrec::{AppState, Catalog, Config};
use tower::ServiceExt;

async fn artist_router(dir: &std::path::Path) -> Router {
    let interactions = dir.join("playlist_artist.dat");
    let ids = dir.join("artist_id_to_num.dat");
    std::fs::write(&interactions, "userId\tartistNo\tweight\n0\t0\t3\n1\t1\t2\n2\t0\t1\n2\t1\t4\n").unwrap();
    std::fs::write(&ids, "no\tartistId\n0\tartist-a\n1\tartist-b\n2\tartist-c\n").unwrap();

    let mut config = Config::default();
    config.als.factors = 2;
    config.als.iterations = 3;
    config.als.num_threads = 1;
    config.data.artist_interactions = interactions;
    config.data.artist_ids = ids;

    let state = AppState::new(config).unwrap();
    state.train_catalog(Catalog::Artist).await.unwrap();
    create_router(state)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Option<Value>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).ok())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_loaded_models() {
    let dir = tempfile::tempdir().unwrap();
    let router = artist_router(dir.path()).await;

    let (status, body) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["artist_model"], "true");
    assert_eq!(body["track_model"], "false");
}

#[tokio::test]
async fn test_similar_artists() {
    let dir = tempfile::tempdir().unwrap();
    let router = artist_router(dir.path()).await;

    let (status, body) = send(&router, post_json("/recommend-similar-artists", json!({"artistId": "artist-a"}))).await;
    assert_eq!(status, StatusCode::OK);
    let result = body.unwrap()["result"].as_array().unwrap().clone();
    assert_eq!(result.len(), 2);
    assert!(!result.contains(&json!("artist-a")));
}

#[tokio::test]
async fn test_invalid_requests_get_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let router = artist_router(dir.path()).await;
    let empty = json!({"result": []});

    let (status, body) = send(&router, post_json("/recommend-similar-artists", json!({"artistId": "  "}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap(), empty);

    let (status, body) = send(&router, post_json("/recommend-similar-artists", json!({"artistId": "nobody"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap(), empty);

    let (status, body) = send(&router, post_json("/recommend-similar-tracks", json!({"trackIds": []}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap(), empty);

    // No track model is loaded.
    let (status, body) = send(&router, post_json("/recommend-similar-tracks", json!({"trackIds": ["t1"]}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap(), empty);
}

#[tokio::test]
async fn test_user_recommendations() {
    let dir = tempfile::tempdir().unwrap();
    let router = artist_router(dir.path()).await;

    let (status, body) = send(&router, get("/users/0/recommendations/artist?n=5")).await;
    assert_eq!(status, StatusCode::OK);
    let result = body.unwrap()["result"].as_array().unwrap().clone();
    assert!(!result.is_empty() && result.len() <= 2);
    assert!(result.iter().all(|item| item["id"] != "artist-a"));

    let (status, body) = send(&router, get("/users/99/recommendations/artists")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap(), json!({"result": []}));
}

#[tokio::test]
async fn test_bad_catalog_and_n() {
    let dir = tempfile::tempdir().unwrap();
    let router = artist_router(dir.path()).await;

    let (status, _) = send(&router, get("/users/0/recommendations/podcasts")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, get("/users/0/recommendations/artist?n=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, get("/users/0/recommendations/artist?n=5000")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder().method("POST").uri("/retrain/podcasts").body(Body::empty()).unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
