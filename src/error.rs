// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every error maps onto one of a small, closed set of [`ErrorKind`]s so the
//! frontend can tell "log in again" apart from "try again later". Upstream
//! error text is logged but never echoed back to the caller.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Public error categories returned in the `kind` field of error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No credentials in the session; the client should start authorization.
    NotAuthenticated,
    /// The request itself was malformed.
    InvalidInput,
    /// Upstream timed out, was unreachable, or is overloaded. Retryable.
    UpstreamUnavailable,
    /// Upstream refused the request (bad token, unknown calendar, quota).
    UpstreamRejected,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotAuthenticated => "not_authenticated",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::UpstreamRejected => "upstream_rejected",
            ErrorKind::Internal => "internal",
        }
    }

    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::UpstreamUnavailable)
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// `status` is the upstream HTTP status, when there was one.
    #[error("Upstream rejected request ({status:?}): {message}")]
    UpstreamRejected {
        status: Option<u16>,
        message: String,
    },

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotAuthenticated => ErrorKind::NotAuthenticated,
            AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            AppError::UpstreamRejected { .. } => ErrorKind::UpstreamRejected,
            AppError::Session(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Classify a transport-level failure from `reqwest`.
    pub fn from_transport(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            AppError::UpstreamUnavailable(format!("{context}: {err}"))
        } else if err.is_decode() {
            AppError::UpstreamRejected {
                status: None,
                message: format!("{context}: undecodable response: {err}"),
            }
        } else {
            AppError::UpstreamUnavailable(format!("{context}: {err}"))
        }
    }

    /// Classify a non-success upstream HTTP status.
    pub fn from_upstream_status(context: &str, status: reqwest::StatusCode, body: &str) -> Self {
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            AppError::UpstreamUnavailable(format!("{context}: HTTP {status}: {body}"))
        } else {
            AppError::UpstreamRejected {
                status: Some(status.as_u16()),
                message: format!("{context}: HTTP {status}: {body}"),
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            // An upstream 401 means the stored access token is no longer
            // accepted; the client has to re-authorize.
            AppError::UpstreamRejected {
                status: Some(401), ..
            } => StatusCode::UNAUTHORIZED,
            AppError::UpstreamRejected { .. } => StatusCode::BAD_GATEWAY,
            AppError::Session(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing message. Only input errors echo their detail.
    fn public_message(&self) -> String {
        match self {
            AppError::NotAuthenticated => "Not authenticated".to_string(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::UpstreamUnavailable(_) => {
                "Calendar provider is temporarily unavailable".to_string()
            }
            AppError::UpstreamRejected {
                status: Some(401), ..
            } => "Calendar provider rejected the stored credentials".to_string(),
            AppError::UpstreamRejected { .. } => {
                "Calendar provider rejected the request".to_string()
            }
            AppError::Session(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: ErrorKind,
    retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = self.status_code();

        match &self {
            AppError::NotAuthenticated | AppError::InvalidInput(_) => {
                tracing::debug!(kind = kind.as_str(), error = %self, "Request rejected");
            }
            AppError::UpstreamUnavailable(_) | AppError::UpstreamRejected { .. } => {
                tracing::warn!(kind = kind.as_str(), error = %self, "Upstream error");
            }
            AppError::Session(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Internal server error");
            }
        }

        let body = ErrorResponse {
            error: self.public_message(),
            kind,
            retryable: kind.is_retryable(),
        };

        let mut response = (status, Json(body)).into_response();
        if kind.is_retryable() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("5"));
        }
        response
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
