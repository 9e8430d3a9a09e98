//! Creation listings and operational endpoints.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestApp;
use creations_service::models::Tier;
use serde_json::json;

#[tokio::test]
async fn user_listing_is_scoped_and_newest_first() {
    let app = TestApp::builder()
        .subscriber("alice", Tier::Premium, 0)
        .subscriber("bob", Tier::Premium, 0)
        .build();

    for prompt in ["first", "second"] {
        app.post_json("/api/ai/generate-article", "alice", json!({"prompt": prompt}))
            .await;
    }
    app.post_json("/api/ai/generate-article", "bob", json!({"prompt": "bob's"}))
        .await;

    let (status, body) = app.get("/api/user/creations", "alice").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let creations = body["creations"].as_array().unwrap();
    assert_eq!(creations.len(), 2);
    assert_eq!(creations[0]["prompt"], "second");
    assert_eq!(creations[1]["prompt"], "first");
    assert_eq!(creations[0]["type"], "article");
    assert!(creations[0]["id"].is_string());
    assert!(creations[0]["created_at"].is_string());
}

#[tokio::test]
async fn listing_honours_limit() {
    let app = TestApp::builder()
        .subscriber("alice", Tier::Premium, 0)
        .build();

    for prompt in ["a", "b", "c"] {
        app.post_json("/api/ai/generate-article", "alice", json!({"prompt": prompt}))
            .await;
    }

    let (status, body) = app.get("/api/user/creations?limit=2", "alice").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["creations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn published_listing_only_shows_published() {
    let app = TestApp::builder()
        .subscriber("alice", Tier::Premium, 0)
        .build();

    app.post_json(
        "/api/ai/generate-image",
        "alice",
        json!({"prompt": "public", "publish": true}),
    )
    .await;
    app.post_json("/api/ai/generate-image", "alice", json!({"prompt": "private"}))
        .await;

    let (status, body) = app.get("/api/creations/published", "someone").await;

    assert_eq!(status, StatusCode::OK);
    let creations = body["creations"].as_array().unwrap();
    assert_eq!(creations.len(), 1);
    assert_eq!(creations[0]["prompt"], "public");
    assert_eq!(creations[0]["publish"], true);
}

#[tokio::test]
async fn listings_require_a_caller() {
    let app = TestApp::builder().build();

    let (status, body) = app
        .send(
            Request::builder()
                .uri("/api/user/creations")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authenticated");
}

#[tokio::test]
async fn health_and_ready_report_ok() {
    let app = TestApp::builder().build();

    let (status, body) = app
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "creations-service");

    let (status, _) = app
        .send(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::builder().build();

    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        Request::builder()
            .uri("/health")
            .header("x-request-id", "req-7")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-7");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}
