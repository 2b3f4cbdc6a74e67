// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Protected routes accept requests with valid tokens
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

use common::{connected_user, create_test_app, create_test_jwt, sample_payload};

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = create_test_app(sample_payload("octocat"));

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/activities")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Should return 401 Unauthorized without token
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let app = create_test_app(sample_payload("octocat"));

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/activities")
                .header(header::AUTHORIZATION, "Bearer invalid.token.here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Should return 401 Unauthorized with invalid token
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let app = create_test_app(sample_payload("octocat"));
    app.store.put_user(connected_user("u1", "octocat"));
    let token = create_test_jwt("u1", &app.signing_key);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/activities")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cookie_token_accepted() {
    let app = create_test_app(sample_payload("octocat"));
    app.store.put_user(connected_user("u1", "octocat"));
    let token = create_test_jwt("u1", &app.signing_key);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/activities")
                .header(header::COOKIE, format!("octotrack_token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sync_without_stored_user_is_unauthorized() {
    let app = create_test_app(sample_payload("octocat"));
    // Valid session token, but no stored user record behind it
    let token = create_test_jwt("ghost", &app.signing_key);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/activities/sync")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = create_test_app(sample_payload("octocat"));

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/activities")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);

    // Should have CORS headers
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let app = create_test_app(sample_payload("octocat"));

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Health should be accessible without auth
    assert_eq!(response.status(), StatusCode::OK);
}
