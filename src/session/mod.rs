// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side session storage.
//!
//! Sessions are addressed by an opaque id carried in a signed cookie (see
//! [`cookie`]). The store is an explicit trait so controllers never touch
//! global state and tests can run against a fresh in-memory store.

pub mod cookie;
pub mod memory;

pub use memory::MemorySessionStore;

use crate::error::AppError;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Session value keys.
pub mod keys {
    /// Anti-forgery token for the pending authorization request.
    pub const OAUTH_STATE: &str = "oauth_state";
    /// Stored credential bundle.
    pub const CREDENTIALS: &str = "credentials";
}

/// Bytes of entropy in session ids and OAuth state tokens.
const TOKEN_BYTES: usize = 32;

/// Keyed session storage.
///
/// Values under one session id are independent; concurrent writers to the
/// same key are last-write-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, AppError>;

    async fn set(&self, session_id: &str, key: &str, value: Value) -> Result<(), AppError>;

    /// Remove a value, returning what was stored.
    async fn delete(&self, session_id: &str, key: &str) -> Result<Option<Value>, AppError>;
}

impl dyn SessionStore {
    /// Typed read of a session value.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<T>, AppError> {
        self.get(session_id, key)
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| AppError::Session(format!("Corrupt session value {key}: {e}")))
    }

    /// Typed write of a session value.
    pub async fn set_json<T: Serialize>(
        &self,
        session_id: &str,
        key: &str,
        value: &T,
    ) -> Result<(), AppError> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::Session(format!("Cannot serialize {key}: {e}")))?;
        self.set(session_id, key, value).await
    }
}

/// Generate a URL-safe random token (session ids, OAuth state).
pub fn generate_token() -> Result<String, AppError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG unavailable")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
