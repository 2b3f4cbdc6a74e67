// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod analytics;
pub mod github;
pub mod normalize;
pub mod scheduler;
pub mod sync;

pub use analytics::AnalyticsService;
pub use github::{ActivitySource, GithubClient, RemotePayload};
pub use scheduler::SyncScheduler;
pub use sync::SyncService;
