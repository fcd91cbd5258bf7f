// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Calendar API client.
//!
//! Records are returned as raw JSON exactly as Google sends them. A client
//! handle is built from a stored [`CredentialBundle`] and nothing else, so
//! tests can swap in a fake [`CalendarConnector`].

use crate::config::Config;
use crate::error::AppError;
use crate::models::{CredentialBundle, EventQuery};
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Upper bound on calendarList pages followed in one request.
const MAX_CALENDAR_LIST_PAGES: usize = 20;

/// Read-only calendar operations for one authenticated user.
#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn list_calendars(&self) -> Result<Vec<Value>, AppError>;

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Value>, AppError>;
}

/// Builds client handles from stored credentials.
pub trait CalendarConnector: Send + Sync {
    fn connect(&self, credentials: &CredentialBundle) -> Box<dyn CalendarClient>;
}

/// Connector for the Google Calendar v3 API.
#[derive(Clone)]
pub struct GoogleCalendarConnector {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleCalendarConnector {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .context("failed building Calendar HTTP client")?;

        Ok(Self {
            http,
            base_url: config.google_calendar_api_url.trim_end_matches('/').to_string(),
        })
    }
}

impl CalendarConnector for GoogleCalendarConnector {
    fn connect(&self, credentials: &CredentialBundle) -> Box<dyn CalendarClient> {
        Box::new(GoogleCalendarClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            access_token: credentials.access_token.clone(),
        })
    }
}

/// Google Calendar client bound to one access token.
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GoogleCalendarClient {
    /// GET a list endpoint and decode one page.
    async fn get_page(
        &self,
        context: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<ListPage, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::from_transport(context, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::from_upstream_status(context, status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::from_transport(context, e))
    }
}

#[async_trait]
impl CalendarClient for GoogleCalendarClient {
    async fn list_calendars(&self) -> Result<Vec<Value>, AppError> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_CALENDAR_LIST_PAGES {
            let query: Vec<(&str, String)> = page_token
                .take()
                .map(|token| vec![("pageToken", token)])
                .unwrap_or_default();

            let page = self.get_page("List calendars", &url, &query).await?;
            calendars.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(calendars),
            }
        }

        tracing::warn!(
            pages = MAX_CALENDAR_LIST_PAGES,
            count = calendars.len(),
            "Calendar list truncated"
        );
        Ok(calendars)
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Value>, AppError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&query.calendar_id)
        );

        let page = self
            .get_page("List events", &url, &query.to_query_pairs())
            .await?;

        tracing::debug!(
            calendar_id = %query.calendar_id,
            count = page.items.len(),
            "Fetched events"
        );
        Ok(page.items)
    }
}

/// One page of a Calendar API list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    next_page_token: Option<String>,
}
