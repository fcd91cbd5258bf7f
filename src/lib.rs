// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Calendar-Proxy: Google Calendar access for a browser frontend
//!
//! This crate provides a small backend that runs the OAuth2 authorization
//! code flow against Google, keeps the resulting credentials in a
//! server-side session, and proxies read-only calendar and event queries.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;

use config::Config;
use services::{AuthService, CalendarConnector, CalendarService, OAuthProvider};
use session::SessionStore;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub auth_service: AuthService,
    pub calendar_service: CalendarService,
}

impl AppState {
    /// Wire both controllers to the same session store.
    pub fn new(
        config: Config,
        sessions: Arc<dyn SessionStore>,
        oauth: Arc<dyn OAuthProvider>,
        connector: Arc<dyn CalendarConnector>,
    ) -> Self {
        let auth_service = AuthService::new(sessions.clone(), oauth, config.frontend_url.clone());
        let calendar_service = CalendarService::new(sessions, connector);

        Self {
            config,
            auth_service,
            calendar_service,
        }
    }
}
