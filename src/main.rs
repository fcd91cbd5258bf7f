// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar-Proxy API Server
//!
//! Lets a browser frontend sign in with Google and read the user's
//! calendars and events through this backend.

use calendar_proxy::{
    config::Config,
    services::{GoogleCalendarConnector, GoogleOAuthClient},
    session::MemorySessionStore,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Calendar-Proxy API");

    // Session store plus a background sweeper for expired sessions
    let sessions = Arc::new(
        MemorySessionStore::new(config.session_ttl)
            .with_initial_ttl(config.session_initial_ttl)
            .with_max_sessions(config.session_max_entries),
    );
    spawn_session_purger(sessions.clone(), config.session_purge_interval);
    tracing::info!(
        ttl_secs = config.session_ttl.as_secs(),
        initial_ttl_secs = config.session_initial_ttl.as_secs(),
        max_sessions = config.session_max_entries,
        "Session store initialized"
    );

    // Upstream clients
    let oauth = Arc::new(GoogleOAuthClient::new(&config)?);
    let connector = Arc::new(GoogleCalendarConnector::new(&config)?);
    tracing::info!(
        client_id = %config.google_client_id,
        redirect_uri = %config.google_redirect_uri,
        timeout_secs = config.upstream_timeout.as_secs(),
        "Google clients initialized"
    );

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), sessions, oauth, connector));

    // Build router
    let app = calendar_proxy::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("calendar_proxy=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}

fn spawn_session_purger(sessions: Arc<MemorySessionStore>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every.max(std::time::Duration::from_secs(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, remaining = sessions.len(), "Purged expired sessions");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
