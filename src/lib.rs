// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Octotrack: GitHub activity synchronization and analytics backend
//!
//! This crate periodically pulls a user's GitHub activity (commits, pull
//! requests, contribution-calendar entries), reconciles it against the
//! stored records, and serves time-windowed aggregates for display.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::ActivityStore;
use services::{AnalyticsService, SyncScheduler, SyncService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ActivityStore>,
    pub sync: SyncService,
    pub scheduler: SyncScheduler,
    pub analytics: AnalyticsService,
}
