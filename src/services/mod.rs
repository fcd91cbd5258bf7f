// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod calendar;
pub mod google_calendar;
pub mod google_oauth;

pub use auth::{AuthService, CallbackParams};
pub use calendar::CalendarService;
pub use google_calendar::{CalendarClient, CalendarConnector, GoogleCalendarConnector};
pub use google_oauth::{GoogleOAuthClient, OAuthProvider};
