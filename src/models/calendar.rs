// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Calendar and event query models.
//!
//! Calendars and events themselves are passed through as raw JSON; only the
//! query parameters are modeled.

use crate::error::AppError;
use crate::time_utils::{format_utc_rfc3339, parse_rfc3339_utc};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_MAX_RESULTS: u32 = 250;
/// Largest page the Calendar API accepts for events.list.
pub const MAX_RESULTS_LIMIT: u32 = 2500;

/// Field added to every event to record which calendar it came from.
pub const CALENDAR_ID_FIELD: &str = "calendarId";

/// Raw `/events` query string. Everything arrives as text so that bad input
/// is reported as `invalid_input` rather than a framework rejection.
#[derive(Debug, Default, Deserialize)]
pub struct EventsRequest {
    pub calendar_id: Option<String>,
    pub max_results: Option<String>,
    pub time_min: Option<String>,
    pub time_max: Option<String>,
}

/// Fully resolved events.list query.
#[derive(Debug, Clone, PartialEq, Validate)]
#[validate(schema(function = "validate_time_window"))]
pub struct EventQuery {
    #[validate(length(min = 1, max = 1024, message = "calendar_id must be 1-1024 characters"))]
    pub calendar_id: String,
    #[validate(range(min = 1, max = 2500, message = "max_results must be between 1 and 2500"))]
    pub max_results: u32,
    pub time_min: DateTime<Utc>,
    pub time_max: Option<DateTime<Utc>>,
}

fn validate_time_window(query: &EventQuery) -> Result<(), ValidationError> {
    match query.time_max {
        Some(time_max) if time_max <= query.time_min => Err(ValidationError::new("time_window")
            .with_message(Cow::Borrowed("time_max must be after time_min"))),
        _ => Ok(()),
    }
}

impl EventQuery {
    /// Apply defaults and validate. `now` becomes the lower bound when the
    /// caller did not give one.
    pub fn resolve(request: EventsRequest, now: DateTime<Utc>) -> Result<Self, AppError> {
        let max_results = match request.max_results.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_MAX_RESULTS,
            Some(raw) => raw.parse().map_err(|_| {
                AppError::InvalidInput(format!("max_results must be an integer, got {raw:?}"))
            })?,
        };

        let time_min = match request.time_min.as_deref() {
            None | Some("") => now,
            Some(raw) => parse_rfc3339_utc(raw).ok_or_else(|| {
                AppError::InvalidInput("time_min must be an RFC3339 timestamp".to_string())
            })?,
        };

        let time_max = match request.time_max.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(parse_rfc3339_utc(raw).ok_or_else(|| {
                AppError::InvalidInput("time_max must be an RFC3339 timestamp".to_string())
            })?),
        };

        let query = Self {
            calendar_id: request
                .calendar_id
                .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
            max_results,
            time_min,
            time_max,
        };

        query
            .validate()
            .map_err(|errors| AppError::InvalidInput(errors.to_string()))?;

        Ok(query)
    }

    /// Query-string pairs for events.list. Recurring events are always
    /// expanded and ordered by start time.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("maxResults", self.max_results.to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("timeMin", format_utc_rfc3339(self.time_min)),
        ];
        if let Some(time_max) = self.time_max {
            pairs.push(("timeMax", format_utc_rfc3339(time_max)));
        }
        pairs
    }
}

/// Tag each event with the calendar it was fetched from.
pub fn annotate_events(events: Vec<Value>, calendar_id: &str) -> Vec<Value> {
    events
        .into_iter()
        .map(|mut event| {
            if let Value::Object(fields) = &mut event {
                fields.insert(
                    CALENDAR_ID_FIELD.to_string(),
                    Value::String(calendar_id.to_string()),
                );
            }
            event
        })
        .collect()
}
