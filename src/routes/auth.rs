// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth authentication routes.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Redirect,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::middleware::SessionId;
use crate::services::CallbackParams;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/init", get(auth_init))
        .route("/auth/callback", get(auth_callback))
        .route("/auth/status", get(auth_status))
        .route("/auth/logout", post(logout))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

/// Start OAuth flow - return the Google authorization URL for the frontend.
async fn auth_init(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<AuthUrlResponse>> {
    let auth_url = state
        .auth_service
        .begin_authorization(session.as_str())
        .await?;
    Ok(Json(AuthUrlResponse { auth_url }))
}

/// OAuth callback - exchange code for tokens, then bounce back to the frontend.
///
/// The browser is always redirected, even when the query string is unusable.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    params: std::result::Result<Query<CallbackParams>, QueryRejection>,
) -> Redirect {
    let target = match params {
        Ok(Query(params)) => {
            state
                .auth_service
                .complete_authorization(session.as_str(), params)
                .await
        }
        Err(rejection) => {
            state
                .auth_service
                .reject_callback(session.as_str(), &rejection.body_text())
                .await
        }
    };
    Redirect::temporary(&target)
}

async fn auth_status(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<AuthStatusResponse>> {
    let authenticated = state
        .auth_service
        .authentication_status(session.as_str())
        .await?;
    Ok(Json(AuthStatusResponse { authenticated }))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<MessageResponse>> {
    state.auth_service.end_session(session.as_str()).await?;
    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}
