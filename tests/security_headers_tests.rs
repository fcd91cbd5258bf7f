// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security header and CORS tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use calendar_proxy::config::Config;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_security_headers_local() {
    let app = common::create_test_app();

    let response = common::send(&app.router, "GET", "/auth/status", None).await;
    let headers = response.headers();

    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert_eq!(
        headers.get("Content-Security-Policy").unwrap(),
        "default-src 'none'; frame-ancestors 'none'"
    );
    assert_eq!(headers.get("Referrer-Policy").unwrap(), "no-referrer");
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    assert!(headers.get("Strict-Transport-Security").is_none());
}

#[tokio::test]
async fn test_hsts_when_served_over_https() {
    let mut config = Config::test_default();
    config.google_redirect_uri = "https://calendar-api.example.com/auth/callback".to_string();
    let app = common::create_test_app_with_config(config);

    let response = common::send(&app.router, "GET", "/health", None).await;

    assert_eq!(
        response.headers().get("Strict-Transport-Security").unwrap(),
        "max-age=31536000; includeSubDomains"
    );
}

#[tokio::test]
async fn test_cors_preflight_allows_frontend_with_credentials() {
    let app = common::create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/events")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_rejects_foreign_origin() {
    let app = common::create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/events")
                .header(header::ORIGIN, "https://evil.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_health() {
    let app = common::create_test_app();

    let response = common::send(&app.router, "GET", "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_cors_rejects_localhost_lookalike() {
    let app = common::create_test_app();

    for origin in [
        "http://localhost.attacker.example",
        "http://127.0.0.1.attacker.example:5173",
    ] {
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth/status")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(
            !response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            "{origin}"
        );
    }
}
