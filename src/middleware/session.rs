// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie middleware.

use crate::error::AppError;
use crate::session::{cookie, generate_token};
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Session id resolved for the current request.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resolve the caller's session from its signed cookie.
///
/// A missing or invalid cookie gets a brand-new session id. The cookie is
/// set on every response so its `Max-Age` slides with the server-side TTL.
pub async fn load_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = &state.config.session_signing_key;

    let existing = jar.get(cookie::SESSION_COOKIE).and_then(|c| {
        cookie::verify(c.value(), key).map(|id| (id, c.value().to_string()))
    });

    let (session_id, cookie_value) = match existing {
        Some(found) => found,
        None => {
            let session_id = generate_token()?;
            let value = cookie::sign(&session_id, key)?;
            tracing::debug!("Issuing new session cookie");
            (session_id, value)
        }
    };

    request.extensions_mut().insert(SessionId(session_id));

    let response = next.run(request).await;

    let jar = jar.add(cookie::session_cookie(cookie_value, &state.config));
    Ok((jar, response).into_response())
}
