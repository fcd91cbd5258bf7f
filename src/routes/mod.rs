// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod auth;
pub mod calendar;

use crate::middleware::load_session;
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Hosts allowed as plain-http dev origins, on any port.
const LOCAL_DEV_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Whether a browser `Origin` may make credentialed requests.
///
/// Either the origin of the configured frontend URL, or exactly
/// `http://localhost[:port]` or `http://127.0.0.1[:port]`.
fn is_allowed_origin(origin: &str, frontend_url: &str) -> bool {
    let frontend_origin = reqwest::Url::parse(frontend_url)
        .map(|url| url.origin().ascii_serialization())
        .unwrap_or_else(|_| frontend_url.to_string());
    if origin == frontend_origin {
        return true;
    }

    let Ok(url) = reqwest::Url::parse(origin) else {
        return false;
    };

    // Anything beyond scheme://host[:port] is not an origin.
    url.scheme() == "http"
        && url.host_str().is_some_and(|host| LOCAL_DEV_HOSTS.contains(&host))
        && url.origin().ascii_serialization() == origin
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow the frontend origin and localhost (for dev).
    // Credentials are required so the browser sends the session cookie.
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| is_allowed_origin(origin, &frontend_url))
            },
        ))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    // Everything that reads or writes the session
    let session_routes = Router::new()
        .merge(auth::routes())
        .merge(calendar::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), load_session));

    Router::new()
        .route("/health", get(health_check))
        .merge(session_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
