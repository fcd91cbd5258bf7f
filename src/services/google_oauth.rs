// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth2 authorization-code flow.
//!
//! Handles:
//! - Authorization URL construction (offline access, forced consent)
//! - Code exchange at the token endpoint
//! - Classification of token endpoint failures

use crate::config::{Config, CALENDAR_READONLY_SCOPE};
use crate::error::AppError;
use crate::models::CredentialBundle;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

/// Authorization server seam.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Build the URL the browser is sent to, bound to `state`.
    fn authorization_url(&self, state: &str) -> Result<String, AppError>;

    /// Exchange an authorization code for a credential bundle.
    async fn exchange_code(&self, code: &str) -> Result<CredentialBundle, AppError>;
}

/// Google OAuth client for a single registered web application.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    auth_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleOAuthClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .context("failed building OAuth HTTP client")?;

        Ok(Self {
            http,
            auth_url: config.google_auth_url.clone(),
            token_url: config.google_token_url.clone(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.google_redirect_uri.clone(),
        })
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> Result<String, AppError> {
        let url = reqwest::Url::parse_with_params(
            &self.auth_url,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", CALENDAR_READONLY_SCOPE),
                ("state", state),
                // Offline access + forced consent so a refresh token is always issued.
                ("access_type", "offline"),
                ("include_granted_scopes", "true"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid authorization URL: {}", e)))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<CredentialBundle, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::from_transport("Token exchange", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| body.clone());
            tracing::error!(status = %status, reason = %reason, "Google token exchange failed");
            return Err(AppError::from_upstream_status(
                "Token exchange",
                status,
                &reason,
            ));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::from_transport("Token exchange", e))?;

        if tokens.refresh_token.is_none() {
            tracing::warn!("Token response carried no refresh token");
        }

        let scopes = tokens
            .scope
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| vec![CALENDAR_READONLY_SCOPE.to_string()]);

        Ok(CredentialBundle {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_uri: self.token_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes,
        })
    }
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Error body per RFC 6749 §5.2 (`invalid_grant`, `invalid_client`, ...).
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
}
