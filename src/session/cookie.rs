// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed session cookie.
//!
//! Cookie value format: `<session_id>.<hex HMAC-SHA256(session_id)>`.

use crate::config::Config;
use crate::error::AppError;
use axum_extra::extract::cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "calendar_session";

/// Sign a session id for use as a cookie value.
pub fn sign(session_id: &str, key: &[u8]) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(session_id.as_bytes());
    let signature = mac.finalize().into_bytes();
    Ok(format!("{}.{}", session_id, hex::encode(signature)))
}

/// Verify a cookie value and return the session id it carries.
pub fn verify(value: &str, key: &[u8]) -> Option<String> {
    let (session_id, signature_hex) = value.rsplit_once('.')?;
    if session_id.is_empty() {
        return None;
    }
    let signature = hex::decode(signature_hex).ok()?;

    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(session_id.as_bytes());
    if mac.verify_slice(&signature).is_err() {
        tracing::warn!("Session cookie signature mismatch");
        return None;
    }

    Some(session_id.to_string())
}

/// Build the session cookie with attributes derived from config.
pub fn session_cookie(value: String, config: &Config) -> Cookie<'static> {
    let max_age = i64::try_from(config.session_ttl.as_secs()).unwrap_or(i64::MAX);

    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::seconds(max_age))
        .build()
}
