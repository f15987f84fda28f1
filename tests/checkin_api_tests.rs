// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP tests for the check-in and engagement endpoints.
//!
//! These verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Each rejection reaches the client with its own status and code
//! 3. History and engagement reflect accepted check-ins

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{create_test_app, create_test_jwt, parse_time, TestApp};
use gym_checkin::middleware::auth::SESSION_COOKIE;

fn post_check_in(token: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/checkins")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn token_for(app: &TestApp, user_id: &str) -> String {
    create_test_jwt(user_id, &app.state.config.jwt_signing_key)
}

#[tokio::test]
async fn test_check_in_requires_auth() {
    let app = create_test_app("2024-01-15T09:00:00Z");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/checkins")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"payload": "GYM-42"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    // No user, no validation attempt
    assert_eq!(app.store.check_in_count(), 0);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = create_test_app("2024-01-15T09:00:00Z");

    let response = app
        .router
        .clone()
        .oneshot(get("/api/engagement", "invalid.token.here"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_accepted() {
    let app = create_test_app("2024-01-15T09:00:00Z");
    let token = token_for(&app, "U");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/engagement")
                .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_visits"], 0);
}

#[tokio::test]
async fn test_check_in_scenario() {
    let app = create_test_app("2024-01-15T09:00:00Z");
    let token = token_for(&app, "U");

    // First scan of the day is accepted
    let response = app
        .router
        .clone()
        .oneshot(post_check_in(&token, json!({"payload": "GYM-42"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["gym_id"], "G");
    assert_eq!(json["local_day"], "2024-01-15");
    assert_eq!(json["checked_in_at"], "2024-01-15T09:00:00Z");

    // Same day, later: conflict carrying the first time
    app.clock.set(parse_time("2024-01-15T14:00:00Z"));
    let response = app
        .router
        .clone()
        .oneshot(post_check_in(&token, json!({"payload": "GYM-42"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "already_checked_in_today");
    assert_eq!(json["checked_in_at"], "2024-01-15T09:00:00Z");
    assert!(json.get("retryable").is_none());

    // Next day: accepted again, streak of two
    app.clock.set(parse_time("2024-01-16T09:00:00Z"));
    let response = app
        .router
        .clone()
        .oneshot(post_check_in(&token, json!({"payload": "GYM-42"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .router
        .clone()
        .oneshot(get("/api/engagement", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["current_streak_days"], 2);
    assert_eq!(json["total_visits"], 2);
    // 2024-01-14 is the Sunday of that week
    assert_eq!(json["visits_this_week"], 2);
    assert_eq!(json["week_starts_at"], "2024-01-14T00:00:00Z");
}

#[tokio::test]
async fn test_unknown_code_rejected() {
    let app = create_test_app("2024-01-15T09:00:00Z");
    let token = token_for(&app, "U");

    let response = app
        .router
        .clone()
        .oneshot(post_check_in(&token, json!({"payload": "not-a-real-token"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "unknown_code");
    assert_eq!(app.store.check_in_count(), 0);
}

#[tokio::test]
async fn test_store_outage_is_retryable() {
    let app = create_test_app("2024-01-15T09:00:00Z");
    let token = token_for(&app, "U");
    app.store.set_offline(true);

    let response = app
        .router
        .clone()
        .oneshot(post_check_in(&token, json!({"payload": "GYM-42"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"], "persistence_failure");
    assert_eq!(json["retryable"], true);
    // Store internals are not echoed
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn test_payload_validation() {
    let app = create_test_app("2024-01-15T09:00:00Z");
    let token = token_for(&app, "U");

    for payload in ["".to_string(), "x".repeat(513)] {
        let response = app
            .router
            .clone()
            .oneshot(post_check_in(&token, json!({ "payload": payload })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_history_is_per_user_newest_first() {
    let app = create_test_app("2024-01-13T09:00:00Z");
    let alice = token_for(&app, "alice");
    let bob = token_for(&app, "bob");

    for now in ["2024-01-13T09:00:00Z", "2024-01-14T09:00:00Z"] {
        app.clock.set(parse_time(now));
        let response = app
            .router
            .clone()
            .oneshot(post_check_in(&alice, json!({"payload": "GYM-42"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .router
        .clone()
        .oneshot(get("/api/checkins", &alice))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["check_ins"][0]["local_day"], "2024-01-14");
    assert_eq!(json["check_ins"][1]["local_day"], "2024-01-13");

    let response = app
        .router
        .clone()
        .oneshot(get("/api/checkins?limit=1", &alice))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["check_ins"].as_array().unwrap().len(), 1);

    let response = app
        .router
        .clone()
        .oneshot(get("/api/checkins", &bob))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn test_history_store_outage_is_database_error() {
    let app = create_test_app("2024-01-15T09:00:00Z");
    let token = token_for(&app, "U");
    app.store.set_offline(true);

    let response = app
        .router
        .clone()
        .oneshot(get("/api/checkins", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "database_error");
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn test_zero_limit_is_bad_request() {
    let app = create_test_app("2024-01-15T09:00:00Z");
    let token = token_for(&app, "U");

    let response = app
        .router
        .clone()
        .oneshot(get("/api/checkins?limit=0", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn test_health_is_public() {
    let app = create_test_app("2024-01-15T09:00:00Z");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}
