// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar and event routes (require credentials in the session).

use crate::error::{AppError, Result};
use crate::middleware::SessionId;
use crate::models::EventsRequest;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events))
        .route("/calendars", get(list_calendars))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventsResponse {
    #[cfg_attr(
        feature = "binding-generation",
        ts(type = "Array<Record<string, unknown>>")
    )]
    pub events: Vec<Value>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarsResponse {
    #[cfg_attr(
        feature = "binding-generation",
        ts(type = "Array<Record<string, unknown>>")
    )]
    pub calendars: Vec<Value>,
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    params: std::result::Result<Query<EventsRequest>, QueryRejection>,
) -> Result<Json<EventsResponse>> {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            // Unauthenticated callers hear about that before their input.
            state
                .calendar_service
                .require_credentials(session.as_str())
                .await?;
            return Err(AppError::InvalidInput(rejection.body_text()));
        }
    };

    let events = state
        .calendar_service
        .list_events(session.as_str(), params)
        .await?;
    Ok(Json(EventsResponse { events }))
}

async fn list_calendars(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<CalendarsResponse>> {
    let calendars = state
        .calendar_service
        .list_calendars(session.as_str())
        .await?;
    Ok(Json(CalendarsResponse { calendars }))
}
