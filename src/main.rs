// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Octotrack API Server
//!
//! Syncs GitHub activity (commits, pull requests, contribution calendar)
//! into Firestore and serves time-windowed analytics over it.

use octotrack::{
    config::Config,
    db::FirestoreStore,
    services::{AnalyticsService, GithubClient, SyncScheduler, SyncService},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Octotrack API");

    // Initialize Firestore database
    let store = Arc::new(
        FirestoreStore::new(&config.gcp_project_id)
            .await
            .expect("Failed to connect to Firestore"),
    ) as Arc<dyn octotrack::db::ActivityStore>;

    // Initialize GitHub client
    let github = Arc::new(GithubClient::new(&config));
    tracing::info!(source = ?config.sync_source, "GitHub client initialized");

    // Sync pipeline and per-user auto-sync scheduler.
    // The scheduler registry is in-memory: schedules do not survive a
    // restart and must be re-armed by their owners.
    let sync = SyncService::new(store.clone(), github);
    let scheduler = SyncScheduler::new(
        sync.clone(),
        Duration::from_secs(config.sync_interval_secs),
    );
    let analytics = AnalyticsService::new(store.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        sync,
        scheduler,
        analytics,
    });

    // Build router
    let app = octotrack::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("octotrack=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
