// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory session store with sliding expiry.

use super::SessionStore;
use crate::error::AppError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

struct SessionEntry {
    values: HashMap<String, Value>,
    expires_at: Instant,
}

/// Sessions held when no cap is configured.
pub const DEFAULT_MAX_SESSIONS: usize = 100_000;

/// Process-local session store.
///
/// A newly created session lives for the initial TTL. Every later access
/// pushes its expiry out by the full TTL. Expired sessions are invisible
/// immediately and reclaimed by [`purge_expired`]. When the store is full, a
/// new session evicts the one closest to expiry.
///
/// [`purge_expired`]: MemorySessionStore::purge_expired
pub struct MemorySessionStore {
    sessions: DashMap<String, SessionEntry>,
    ttl: Duration,
    initial_ttl: Duration,
    max_sessions: usize,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            initial_ttl: ttl,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Lifetime of a session that has been written once and never touched
    /// again, e.g. an abandoned authorization attempt. Capped at the TTL.
    pub fn with_initial_ttl(mut self, initial_ttl: Duration) -> Self {
        self.initial_ttl = initial_ttl.min(self.ttl);
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.sessions.len())
    }

    /// Number of sessions currently held, expired or not.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Make room for one more session. The cap is approximate under
    /// concurrent inserts.
    fn make_room(&self) {
        if self.sessions.len() < self.max_sessions {
            return;
        }
        if self.purge_expired() > 0 && self.sessions.len() < self.max_sessions {
            return;
        }

        let victim = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.expires_at)
            .map(|entry| entry.key().clone());
        if let Some(victim) = victim {
            self.sessions.remove(&victim);
            tracing::warn!(
                max_sessions = self.max_sessions,
                "Session store full, evicted session closest to expiry"
            );
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, AppError> {
        let now = Instant::now();
        let Some(mut entry) = self.sessions.get_mut(session_id) else {
            return Ok(None);
        };

        if entry.expires_at <= now {
            drop(entry);
            self.sessions.remove(session_id);
            return Ok(None);
        }

        entry.expires_at = now + self.ttl;
        Ok(entry.values.get(key).cloned())
    }

    async fn set(&self, session_id: &str, key: &str, value: Value) -> Result<(), AppError> {
        if !self.sessions.contains_key(session_id) {
            self.make_room();
        }

        let now = Instant::now();
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry {
                values: HashMap::new(),
                expires_at: now,
            });

        // Fresh or expired entries start over on the initial lease.
        if entry.expires_at <= now {
            entry.values.clear();
            entry.expires_at = now + self.initial_ttl;
        } else {
            entry.expires_at = now + self.ttl;
        }
        entry.values.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, session_id: &str, key: &str) -> Result<Option<Value>, AppError> {
        let now = Instant::now();
        let Some(mut entry) = self.sessions.get_mut(session_id) else {
            return Ok(None);
        };

        if entry.expires_at <= now {
            drop(entry);
            self.sessions.remove(session_id);
            return Ok(None);
        }

        Ok(entry.values.remove(key))
    }
}
