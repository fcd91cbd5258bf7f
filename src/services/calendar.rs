// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar queries on behalf of the session's user.

use crate::error::{AppError, Result};
use crate::models::{annotate_events, CredentialBundle, EventQuery, EventsRequest};
use crate::services::google_calendar::{CalendarClient, CalendarConnector};
use crate::session::{keys, SessionStore};
use serde_json::Value;
use std::sync::Arc;

/// Read-only calendar access backed by the credentials in a session.
pub struct CalendarService {
    sessions: Arc<dyn SessionStore>,
    connector: Arc<dyn CalendarConnector>,
}

impl CalendarService {
    pub fn new(sessions: Arc<dyn SessionStore>, connector: Arc<dyn CalendarConnector>) -> Self {
        Self {
            sessions,
            connector,
        }
    }

    /// Stored credentials for the session, or `NotAuthenticated`.
    pub async fn require_credentials(&self, session_id: &str) -> Result<CredentialBundle> {
        self.sessions
            .get_json(session_id, keys::CREDENTIALS)
            .await?
            .ok_or(AppError::NotAuthenticated)
    }

    /// Build a client from stored credentials, or fail before any upstream call.
    async fn client_for(&self, session_id: &str) -> Result<Box<dyn CalendarClient>> {
        let credentials = self.require_credentials(session_id).await?;
        Ok(self.connector.connect(&credentials))
    }

    /// All calendars on the user's calendar list, verbatim.
    pub async fn list_calendars(&self, session_id: &str) -> Result<Vec<Value>> {
        let client = self.client_for(session_id).await?;
        client.list_calendars().await
    }

    /// Upcoming (by default) events of one calendar, each tagged with
    /// `calendarId`.
    pub async fn list_events(&self, session_id: &str, request: EventsRequest) -> Result<Vec<Value>> {
        let client = self.client_for(session_id).await?;
        let query = EventQuery::resolve(request, chrono::Utc::now())?;

        tracing::debug!(
            calendar_id = %query.calendar_id,
            max_results = query.max_results,
            time_min = %query.time_min,
            time_max = ?query.time_max,
            "Listing events"
        );

        let events = client.list_events(&query).await?;
        Ok(annotate_events(events, &query.calendar_id))
    }
}
