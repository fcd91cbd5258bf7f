// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development. Google OAuth client
//! credentials and the session signing key are required; everything else
//! has a default suitable for running next to a Vite dev server.

use std::env;
use std::time::Duration;

/// Read-only Google Calendar scope requested during authorization.
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

pub const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_GOOGLE_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

/// HMAC keys shorter than this are rejected at startup.
const MIN_SIGNING_KEY_LEN: usize = 32;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Google OAuth client ---
    /// OAuth client ID (public)
    pub google_client_id: String,
    /// OAuth client secret
    pub google_client_secret: String,
    /// Callback URL registered with Google (points at `/auth/callback`)
    pub google_redirect_uri: String,

    // --- Upstream endpoints (overridable for tests) ---
    pub google_auth_url: String,
    pub google_token_url: String,
    pub google_calendar_api_url: String,
    /// Per-request timeout for every upstream call
    pub upstream_timeout: Duration,

    // --- HTTP surface ---
    /// Frontend origin; OAuth callbacks redirect here
    pub frontend_url: String,
    /// Server port
    pub port: u16,

    // --- Sessions ---
    /// HMAC key for the session cookie (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// Idle lifetime of a server-side session
    pub session_ttl: Duration,
    /// Lifetime of a session written only once (abandoned sign-in attempts)
    pub session_initial_ttl: Duration,
    /// Upper bound on sessions held in memory
    pub session_max_entries: usize,
    /// How often expired sessions are swept from the store
    pub session_purge_interval: Duration,
}

impl Config {
    /// Config for tests. Never use outside of tests.
    pub fn test_default() -> Self {
        Self {
            google_client_id: "test_client_id".to_string(),
            google_client_secret: "test_client_secret".to_string(),
            google_redirect_uri: "http://localhost:8000/auth/callback".to_string(),
            google_auth_url: DEFAULT_GOOGLE_AUTH_URL.to_string(),
            google_token_url: DEFAULT_GOOGLE_TOKEN_URL.to_string(),
            google_calendar_api_url: DEFAULT_GOOGLE_CALENDAR_API_URL.to_string(),
            upstream_timeout: Duration::from_secs(10),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8000,
            session_signing_key: b"test_session_key_32_bytes_minimum!!".to_vec(),
            session_ttl: Duration::from_secs(14 * 24 * 60 * 60),
            session_initial_ttl: Duration::from_secs(600),
            session_max_entries: 100_000,
            session_purge_interval: Duration::from_secs(300),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let session_signing_key = required("SESSION_SIGNING_KEY")?.into_bytes();
        if session_signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid {
                name: "SESSION_SIGNING_KEY",
                reason: format!("must be at least {MIN_SIGNING_KEY_LEN} bytes"),
            });
        }

        let frontend_url = env::var("FRONTEND_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| "http://localhost:5173".to_string());
        if let Err(e) = reqwest::Url::parse(&frontend_url) {
            return Err(ConfigError::Invalid {
                name: "FRONTEND_URL",
                reason: e.to_string(),
            });
        }

        Ok(Self {
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
            google_redirect_uri: env::var("GOOGLE_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:8000/auth/callback".to_string()),
            google_auth_url: env::var("GOOGLE_AUTH_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_AUTH_URL.to_string()),
            google_token_url: env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_TOKEN_URL.to_string()),
            google_calendar_api_url: env::var("GOOGLE_CALENDAR_API_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_CALENDAR_API_URL.to_string()),
            upstream_timeout: Duration::from_secs(parse_or("UPSTREAM_TIMEOUT_SECS", 10)?),
            frontend_url,
            port: parse_or("PORT", 8000)?,
            session_signing_key,
            session_ttl: Duration::from_secs(parse_or("SESSION_TTL_SECS", 14 * 24 * 60 * 60)?),
            session_initial_ttl: Duration::from_secs(parse_or("SESSION_INITIAL_TTL_SECS", 600)?),
            session_max_entries: parse_or("SESSION_MAX_ENTRIES", 100_000)?,
            session_purge_interval: Duration::from_secs(parse_or(
                "SESSION_PURGE_INTERVAL_SECS",
                300,
            )?),
        })
    }

    /// Whether the session cookie must carry the `Secure` attribute.
    ///
    /// Derived from the public callback URL, which is the origin the browser
    /// actually talks to.
    pub fn secure_cookies(&self) -> bool {
        self.google_redirect_uri.starts_with("https://")
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            reason: format!("cannot parse {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid environment variable {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
