// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth session lifecycle.
//!
//! Per session: `unauthenticated -> authorizing -> authenticated ->
//! unauthenticated`. The state token is single-use, so a failed callback
//! drops the session back to `unauthenticated`.

use crate::error::{AppError, ErrorKind, Result};
use crate::models::CredentialBundle;
use crate::services::google_oauth::OAuthProvider;
use crate::session::{generate_token, keys, SessionStore};
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Query parameters Google appends to the redirect URI.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Set instead of `code` when the user denied consent.
    #[serde(default)]
    pub error: Option<String>,
}

/// Why a callback did not produce credentials.
#[derive(Debug, thiserror::Error)]
enum CallbackFailure {
    #[error("provider returned error {0}")]
    ProviderDenied(String),
    #[error("callback carried no authorization code")]
    MissingCode,
    #[error("state token missing or mismatched")]
    StateMismatch,
    #[error("code exchange failed: {0}")]
    Exchange(AppError),
    #[error("session store failed: {0}")]
    Session(AppError),
    #[error("malformed callback query: {0}")]
    Malformed(String),
}

impl CallbackFailure {
    /// Short message shown to the user on the frontend.
    fn user_message(&self) -> String {
        match self {
            CallbackFailure::ProviderDenied(code) => code.clone(),
            CallbackFailure::MissingCode => "Missing authorization code".to_string(),
            CallbackFailure::StateMismatch => "Invalid or expired authorization state".to_string(),
            CallbackFailure::Exchange(err) => match err.kind() {
                ErrorKind::UpstreamUnavailable => {
                    "Authorization server unavailable, please try again".to_string()
                }
                ErrorKind::UpstreamRejected => {
                    "Authorization code was rejected, please sign in again".to_string()
                }
                _ => "Authorization failed".to_string(),
            },
            CallbackFailure::Session(_) => "Authorization failed".to_string(),
            CallbackFailure::Malformed(_) => "Malformed authorization callback".to_string(),
        }
    }
}

/// Drives the authorization-code flow and keeps credentials in the session.
pub struct AuthService {
    sessions: Arc<dyn SessionStore>,
    oauth: Arc<dyn OAuthProvider>,
    frontend_url: String,
}

impl AuthService {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        oauth: Arc<dyn OAuthProvider>,
        frontend_url: String,
    ) -> Self {
        Self {
            sessions,
            oauth,
            frontend_url,
        }
    }

    /// Issue a fresh state token and return the provider authorization URL.
    pub async fn begin_authorization(&self, session_id: &str) -> Result<String> {
        let state = generate_token()?;
        let auth_url = self.oauth.authorization_url(&state)?;

        self.sessions
            .set_json(session_id, keys::OAUTH_STATE, &state)
            .await?;

        tracing::info!("Starting OAuth flow");
        Ok(auth_url)
    }

    /// Finish the flow and return where to send the browser.
    ///
    /// Never fails: every outcome is a redirect to the frontend with
    /// `auth=success` or `auth=error&message=...`.
    pub async fn complete_authorization(&self, session_id: &str, params: CallbackParams) -> String {
        let outcome = self.try_complete(session_id, params).await;
        self.redirect_for(outcome)
    }

    /// Fail a callback whose query string could not be parsed.
    ///
    /// The pending state token is consumed exactly as for a parsed callback.
    pub async fn reject_callback(&self, session_id: &str, detail: &str) -> String {
        let failure = match self.sessions.delete(session_id, keys::OAUTH_STATE).await {
            Ok(_) => CallbackFailure::Malformed(detail.to_string()),
            Err(e) => CallbackFailure::Session(e),
        };
        self.redirect_for(Err(failure))
    }

    fn redirect_for(&self, outcome: std::result::Result<(), CallbackFailure>) -> String {
        match outcome {
            Ok(()) => {
                tracing::info!("OAuth successful, credentials stored in session");
                self.frontend_redirect(&[("auth", "success")])
            }
            Err(failure) => {
                tracing::warn!(reason = %failure, "OAuth callback failed");
                self.frontend_redirect(&[("auth", "error"), ("message", &failure.user_message())])
            }
        }
    }

    /// Frontend URL with `pairs` appended to whatever query it already has.
    fn frontend_redirect(&self, pairs: &[(&str, &str)]) -> String {
        match reqwest::Url::parse(&self.frontend_url) {
            Ok(mut url) => {
                url.query_pairs_mut().extend_pairs(pairs);
                url.into()
            }
            Err(e) => {
                // Config validates FRONTEND_URL, so only hand-built configs get here.
                tracing::error!(error = %e, "Frontend URL does not parse");
                let query: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                    .collect();
                format!("{}?{}", self.frontend_url, query.join("&"))
            }
        }
    }

    async fn try_complete(
        &self,
        session_id: &str,
        params: CallbackParams,
    ) -> std::result::Result<(), CallbackFailure> {
        // Consume the state token first so it can never be replayed.
        let expected_state: Option<String> = self
            .sessions
            .delete(session_id, keys::OAUTH_STATE)
            .await
            .map_err(CallbackFailure::Session)?
            .and_then(|v| v.as_str().map(str::to_string));

        if let Some(error) = params.error {
            return Err(CallbackFailure::ProviderDenied(error));
        }

        let code = params
            .code
            .filter(|c| !c.is_empty())
            .ok_or(CallbackFailure::MissingCode)?;

        match (expected_state, params.state) {
            (Some(expected), Some(received))
                if bool::from(expected.as_bytes().ct_eq(received.as_bytes())) => {}
            _ => return Err(CallbackFailure::StateMismatch),
        }

        tracing::info!("Exchanging authorization code for tokens");
        let credentials: CredentialBundle = self
            .oauth
            .exchange_code(&code)
            .await
            .map_err(CallbackFailure::Exchange)?;

        self.sessions
            .set_json(session_id, keys::CREDENTIALS, &credentials)
            .await
            .map_err(CallbackFailure::Session)?;

        Ok(())
    }

    /// Whether credentials are stored. Not checked against the provider.
    pub async fn authentication_status(&self, session_id: &str) -> Result<bool> {
        Ok(self
            .sessions
            .get(session_id, keys::CREDENTIALS)
            .await?
            .is_some())
    }

    /// Forget stored credentials and any pending state token. Idempotent.
    pub async fn end_session(&self, session_id: &str) -> Result<()> {
        let had_credentials = self
            .sessions
            .delete(session_id, keys::CREDENTIALS)
            .await?
            .is_some();
        self.sessions.delete(session_id, keys::OAUTH_STATE).await?;

        tracing::info!(had_credentials, "Session logged out");
        Ok(())
    }
}
