// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! OAuth credential bundle kept in the session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything needed to act as an authenticated calendar client.
///
/// Stored as-is in the session after a successful code exchange and read
/// back on every calendar query. Contents are not validated; a stale or
/// malformed bundle shows up as an upstream rejection.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialBundle {
    /// Bearer token for the Calendar API
    pub access_token: String,
    /// Only present when the user granted offline access
    pub refresh_token: Option<String>,
    /// Token endpoint the bundle was issued by
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    /// Scopes actually granted (may differ from the requested set)
    pub scopes: Vec<String>,
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scopes", &self.scopes)
            .finish()
    }
}
