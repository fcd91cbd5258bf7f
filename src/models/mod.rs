// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod calendar;
pub mod credentials;

pub use calendar::{annotate_events, EventQuery, EventsRequest};
pub use credentials::CredentialBundle;
