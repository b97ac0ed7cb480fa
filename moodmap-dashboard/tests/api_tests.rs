//! Integration tests for moodmap-dashboard endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use moodmap_dashboard::{build_router, AppState};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

fn setup_app() -> Router {
    build_router(AppState::with_default_dataset())
}

fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn extract_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// =============================================================================
// Page and health
// =============================================================================

#[tokio::test]
async fn test_index_page() {
    let response = setup_app().oneshot(test_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("<canvas id=\"scatter\""));
    assert!(html.contains("/static/dashboard.js"));
}

#[tokio::test]
async fn test_static_script_not_cached() {
    let response = setup_app()
        .oneshot(test_request("/static/dashboard.js"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["cache-control"],
        "no-cache, no-store, must-revalidate"
    );
}

#[tokio::test]
async fn test_health() {
    let response = setup_app().oneshot(test_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "moodmap-dashboard");
    assert_eq!(json["tracks"], 400);
}

// =============================================================================
// Mood map
// =============================================================================

#[tokio::test]
async fn test_mood_map_unfiltered() {
    let response = setup_app()
        .oneshot(test_request("/api/mood-map"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response).await;
    assert_eq!(json["count"], 400);
    assert_eq!(json["tracks"][0]["title"], "Track 0");
}

#[tokio::test]
async fn test_mood_map_filtered_inclusive() {
    let response = setup_app()
        .oneshot(test_request(
            "/api/mood-map?e_min=0.5&e_max=1&v_min=0&v_max=0.5",
        ))
        .await
        .unwrap();
    let json = extract_json(response).await;
    let tracks = json["tracks"].as_array().unwrap();

    assert!(!tracks.is_empty());
    assert!(tracks.len() < 400);
    for track in tracks {
        let energy = track["energy"].as_f64().unwrap();
        let valence = track["valence"].as_f64().unwrap();
        assert!((0.5..=1.0).contains(&energy));
        assert!((0.0..=0.5).contains(&valence));
    }
}

#[tokio::test]
async fn test_mood_map_inverted_range_rejected() {
    let response = setup_app()
        .oneshot(test_request("/api/mood-map?e_min=0.9&e_max=0.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = extract_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

// =============================================================================
// Playlist
// =============================================================================

#[tokio::test]
async fn test_playlist_default_size() {
    let response = setup_app()
        .oneshot(test_request("/api/playlist"))
        .await
        .unwrap();
    let json = extract_json(response).await;
    assert_eq!(json["count"], 20);
    assert_eq!(json["tracks"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_playlist_smaller_than_size_when_filter_tight() {
    let response = setup_app()
        .oneshot(test_request(
            "/api/playlist?e_min=0&e_max=0.05&v_min=0&v_max=0.05",
        ))
        .await
        .unwrap();
    let json = extract_json(response).await;
    assert!(json["count"].as_u64().unwrap() < 20);
}

#[tokio::test]
async fn test_playlist_seed_is_reproducible() {
    let app = setup_app();
    let first = extract_json(
        app.clone()
            .oneshot(test_request("/api/playlist?seed=11"))
            .await
            .unwrap(),
    )
    .await;
    let second = extract_json(
        app.oneshot(test_request("/api/playlist?seed=11"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_playlist_csv_matches_json_sample() {
    let app = setup_app();
    let json = extract_json(
        app.clone()
            .oneshot(test_request("/api/playlist?seed=5&size=3"))
            .await
            .unwrap(),
    )
    .await;

    let response = app
        .oneshot(test_request("/api/playlist.csv?seed=5&size=3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=moodmap_playlist.csv"
    );

    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "title,artist,energy,valence");
    assert_eq!(lines.len(), 4);
    for (line, track) in lines[1..].iter().zip(json["tracks"].as_array().unwrap()) {
        assert!(line.starts_with(&format!("{},", track["title"].as_str().unwrap())));
    }
}

#[tokio::test]
async fn test_playlist_zero_size_rejected() {
    let response = setup_app()
        .oneshot(test_request("/api/playlist?size=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Clusters
// =============================================================================

#[tokio::test]
async fn test_clusters_default_k() {
    let response = setup_app()
        .oneshot(test_request("/api/clusters"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response).await;
    assert_eq!(json["k"], 12);
    assert_eq!(json["centroids"].as_array().unwrap().len(), 12);

    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 400);
    assert!(points
        .iter()
        .all(|p| p["cluster"].as_u64().unwrap() < 12));
}

#[tokio::test]
async fn test_clusters_on_filtered_subset() {
    let response = setup_app()
        .oneshot(test_request("/api/clusters?k=3&e_min=0.5&e_max=1"))
        .await
        .unwrap();
    let json = extract_json(response).await;

    let points = json["points"].as_array().unwrap();
    assert!(points.len() < 400);
    assert!(points
        .iter()
        .all(|p| p["energy"].as_f64().unwrap() >= 0.5));
    assert!(points.iter().all(|p| p["cluster"].as_u64().unwrap() < 3));
}

#[tokio::test]
async fn test_clusters_empty_selection() {
    let response = setup_app()
        .oneshot(test_request(
            "/api/clusters?e_min=0.999999&e_max=0.999999&v_min=0.999999&v_max=0.999999",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response).await;
    assert!(json["points"].as_array().unwrap().is_empty());
    assert!(json["centroids"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_clusters_k_out_of_range() {
    for k in [1, 31] {
        let response = setup_app()
            .oneshot(test_request(&format!("/api/clusters?k={}", k)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
