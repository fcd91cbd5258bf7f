// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use calendar_proxy::config::Config;
use calendar_proxy::error::AppError;
use calendar_proxy::models::{CredentialBundle, EventQuery};
use calendar_proxy::routes::create_router;
use calendar_proxy::services::{CalendarClient, CalendarConnector, OAuthProvider};
use calendar_proxy::session::{cookie::SESSION_COOKIE, MemorySessionStore};
use calendar_proxy::AppState;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// Authorization code the fake OAuth provider accepts.
#[allow(dead_code)]
pub const VALID_CODE: &str = "valid-code";

/// Fake authorization server: accepts only [`VALID_CODE`].
#[derive(Default)]
pub struct FakeOAuth {
    pub exchanged_codes: Mutex<Vec<String>>,
}

#[async_trait]
impl OAuthProvider for FakeOAuth {
    fn authorization_url(&self, state: &str) -> Result<String, AppError> {
        Ok(format!(
            "https://accounts.example/o/oauth2/auth?access_type=offline&prompt=consent&state={state}"
        ))
    }

    async fn exchange_code(&self, code: &str) -> Result<CredentialBundle, AppError> {
        self.exchanged_codes.lock().unwrap().push(code.to_string());
        if code != VALID_CODE {
            return Err(AppError::UpstreamRejected {
                status: Some(400),
                message: "invalid_grant: Bad Request".to_string(),
            });
        }
        Ok(CredentialBundle {
            access_token: "fake-access-token".to_string(),
            refresh_token: Some("fake-refresh-token".to_string()),
            token_uri: "https://oauth2.example/token".to_string(),
            client_id: "test_client_id".to_string(),
            client_secret: "test_client_secret".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/calendar.readonly".to_string()],
        })
    }
}

/// Canned upstream failure for the fake calendar.
#[derive(Clone, Copy)]
#[allow(dead_code)]
pub enum UpstreamFailure {
    Unavailable,
    Unauthorized,
    NotFound,
}

/// Fake calendar provider that records every call.
#[derive(Default)]
pub struct FakeCalendar {
    pub connected_tokens: Mutex<Vec<String>>,
    pub event_queries: Mutex<Vec<EventQuery>>,
    pub calendar_calls: Mutex<usize>,
    pub failure: Mutex<Option<UpstreamFailure>>,
}

#[allow(dead_code)]
impl FakeCalendar {
    pub fn calendars() -> Vec<Value> {
        vec![
            json!({"kind": "calendar#calendarListEntry", "id": "primary@example.com", "summary": "Me", "primary": true}),
            json!({"kind": "calendar#calendarListEntry", "id": "team@group.calendar.google.com", "summary": "Team"}),
        ]
    }

    pub fn events() -> Vec<Value> {
        vec![
            json!({"id": "evt1", "summary": "Standup", "start": {"dateTime": "2026-10-19T09:00:00Z"}}),
            json!({"id": "evt2", "summary": "Lunch", "start": {"dateTime": "2026-10-19T12:00:00Z"}}),
        ]
    }

    pub fn fail_with(&self, failure: UpstreamFailure) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    pub fn upstream_calls(&self) -> usize {
        *self.calendar_calls.lock().unwrap() + self.event_queries.lock().unwrap().len()
    }

    fn check_failure(&self) -> Result<(), AppError> {
        match *self.failure.lock().unwrap() {
            None => Ok(()),
            Some(UpstreamFailure::Unavailable) => Err(AppError::UpstreamUnavailable(
                "List events: operation timed out".to_string(),
            )),
            Some(UpstreamFailure::Unauthorized) => Err(AppError::UpstreamRejected {
                status: Some(401),
                message: "Invalid Credentials".to_string(),
            }),
            Some(UpstreamFailure::NotFound) => Err(AppError::UpstreamRejected {
                status: Some(404),
                message: "Not Found".to_string(),
            }),
        }
    }
}

struct FakeCalendarClient {
    fake: Arc<FakeCalendar>,
}

#[async_trait]
impl CalendarClient for FakeCalendarClient {
    async fn list_calendars(&self) -> Result<Vec<Value>, AppError> {
        *self.fake.calendar_calls.lock().unwrap() += 1;
        self.fake.check_failure()?;
        Ok(FakeCalendar::calendars())
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Value>, AppError> {
        self.fake.event_queries.lock().unwrap().push(query.clone());
        self.fake.check_failure()?;
        Ok(FakeCalendar::events())
    }
}

struct FakeConnector(Arc<FakeCalendar>);

impl CalendarConnector for FakeConnector {
    fn connect(&self, credentials: &CredentialBundle) -> Box<dyn CalendarClient> {
        self.0
            .connected_tokens
            .lock()
            .unwrap()
            .push(credentials.access_token.clone());
        Box::new(FakeCalendarClient {
            fake: self.0.clone(),
        })
    }
}

/// Handles to the fakes behind a test app.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub sessions: Arc<MemorySessionStore>,
    pub oauth: Arc<FakeOAuth>,
    pub calendar: Arc<FakeCalendar>,
}

/// Create a test app with offline fake dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(3600)));
    let oauth = Arc::new(FakeOAuth::default());
    let calendar = Arc::new(FakeCalendar::default());

    let state = Arc::new(AppState::new(
        config,
        sessions.clone(),
        oauth.clone(),
        Arc::new(FakeConnector(calendar.clone())),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        sessions,
        oauth,
        calendar,
    }
}

/// Send a request, optionally carrying a session cookie value.
#[allow(dead_code)]
pub async fn send(router: &Router, method: &str, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={cookie}"));
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Value of the session cookie set by a response, if any.
#[allow(dead_code)]
pub fn session_cookie_value(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{SESSION_COOKIE}=")))
        .and_then(|v| v.split(';').next())
        .map(|pair| pair[SESSION_COOKIE.len() + 1..].to_string())
}

#[allow(dead_code)]
pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
        .to_string()
}

/// Run init + callback with the given code. Returns the session cookie and
/// the callback's redirect target.
#[allow(dead_code)]
pub async fn authorize(router: &Router, code: &str) -> (String, String) {
    let init = send(router, "GET", "/auth/init", None).await;
    let cookie = session_cookie_value(&init).expect("init should issue a session cookie");
    let body = json_body(init).await;

    let auth_url = reqwest::Url::parse(body["auth_url"].as_str().unwrap()).unwrap();
    let state = auth_url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let callback = send(
        router,
        "GET",
        &format!("/auth/callback?code={code}&state={state}&scope=calendar.readonly"),
        Some(&cookie),
    )
    .await;

    (cookie, location(&callback))
}
