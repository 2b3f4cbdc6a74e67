// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user auto-sync scheduler.
//!
//! Owns the registry mapping a user ID to its single recurring sync task.
//! The registry is in-memory only and is not reconstructed after a process
//! restart; callers must re-arm schedules they need.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::services::sync::SyncService;

/// Explicit scheduler object, owned by the composition root.
#[derive(Clone)]
pub struct SyncScheduler {
    sync: SyncService,
    interval: Duration,
    timers: Arc<DashMap<String, JoinHandle<()>>>,
}

impl SyncScheduler {
    pub fn new(sync: SyncService, interval: Duration) -> Self {
        Self {
            sync,
            interval,
            timers: Arc::new(DashMap::new()),
        }
    }

    /// Arm (or re-arm) auto-sync for a user.
    ///
    /// Returns `Ok(false)` without registering anything when the user has no
    /// stored credential. Re-arming an already-scheduled user replaces the
    /// existing timer rather than stacking a second one.
    pub async fn enable(&self, user_id: &str) -> Result<bool, AppError> {
        let has_credential = self
            .sync
            .store()
            .get_user(user_id)
            .await?
            .is_some_and(|u| u.credential().is_some());
        if !has_credential {
            tracing::warn!(user_id, "Auto-sync refused: no stored access token");
            return Ok(false);
        }

        let sync = self.sync.clone();
        let uid = user_id.to_string();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; consume it so the first
            // sync fires one full interval after arming.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                // A failed tick is logged and the schedule survives; the
                // next tick still fires at the fixed interval.
                if let Err(e) = sync.sync_now(&uid).await {
                    tracing::warn!(user_id = %uid, error = %e, "Auto-sync tick failed");
                }
            }
        });

        if let Some(previous) = self.timers.insert(user_id.to_string(), handle) {
            previous.abort();
            tracing::info!(user_id, "Auto-sync timer replaced");
        } else {
            tracing::info!(user_id, interval_secs = interval.as_secs(), "Auto-sync enabled");
        }

        Ok(true)
    }

    /// Cancel a user's auto-sync. Returns `false` with no side effect when
    /// the user is not scheduled; safe to call repeatedly.
    pub fn disable(&self, user_id: &str) -> bool {
        match self.timers.remove(user_id) {
            Some((_, handle)) => {
                handle.abort();
                tracing::info!(user_id, "Auto-sync disabled");
                true
            }
            None => false,
        }
    }

    /// Whether a user currently has an active schedule.
    pub fn is_scheduled(&self, user_id: &str) -> bool {
        self.timers.contains_key(user_id)
    }

    /// Number of users with an active schedule.
    pub fn scheduled_count(&self) -> usize {
        self.timers.len()
    }
}
