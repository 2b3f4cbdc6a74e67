// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync orchestrator and dedup/persistence engine.
//!
//! `sync_now` is the single entry point for both on-demand requests and
//! scheduled ticks:
//! 1. Resolve the user's credential
//! 2. Fetch from the remote source
//! 3. Normalize into candidates
//! 4. Reconcile against the store and persist the delta

use std::sync::Arc;

use crate::db::ActivityStore;
use crate::error::AppError;
use crate::models::{Activity, ActivityType, NewActivity};
use crate::services::github::ActivitySource;
use crate::services::normalize;

/// Drives one sync cycle for a user.
#[derive(Clone)]
pub struct SyncService {
    store: Arc<dyn ActivityStore>,
    source: Arc<dyn ActivitySource>,
}

impl SyncService {
    pub fn new(store: Arc<dyn ActivityStore>, source: Arc<dyn ActivitySource>) -> Self {
        Self { store, source }
    }

    pub fn store(&self) -> &Arc<dyn ActivityStore> {
        &self.store
    }

    /// Fetch, normalize and reconcile the user's remote activity.
    ///
    /// Returns the delta actually persisted. Remote and store errors
    /// propagate uncaught; retry is the scheduler's job via its next tick,
    /// never this call's.
    pub async fn sync_now(&self, user_id: &str) -> Result<Vec<Activity>, AppError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AppError::CredentialMissing)?;
        let access_token = user.credential().ok_or(AppError::CredentialMissing)?;

        let payload = self
            .source
            .fetch_activity(&user.username, access_token)
            .await?;

        let candidates = normalize::normalize_payload(&payload, user_id, &user.username);
        tracing::debug!(
            user_id,
            username = %user.username,
            candidates = candidates.len(),
            "Normalized remote payload"
        );

        let written = self.reconcile(user_id, candidates).await?;
        tracing::info!(user_id, written = written.len(), "Sync complete");
        Ok(written)
    }

    /// Decide per candidate whether it is new (append) or authoritative
    /// (overwrite), and persist accordingly.
    ///
    /// Contribution rows are replaced wholesale: the remote calendar can
    /// retroactively recompute daily counts, so append-only dedup would
    /// freeze the first value seen. Commits and PRs are immutable once
    /// created, so they are appended only when their `event_id` is unseen.
    pub async fn reconcile(
        &self,
        user_id: &str,
        candidates: Vec<NewActivity>,
    ) -> Result<Vec<Activity>, AppError> {
        let (contributions, others): (Vec<NewActivity>, Vec<NewActivity>) = candidates
            .into_iter()
            .partition(|c| c.activity_type == ActivityType::Contribution);

        let mut written = Vec::new();

        if !contributions.is_empty() {
            let deleted = self
                .store
                .delete_activities(user_id, ActivityType::Contribution)
                .await?;
            tracing::debug!(user_id, deleted, fresh = contributions.len(), "Replacing contributions");
            written.extend(self.store.insert_activities(&contributions).await?);
        }

        if !others.is_empty() {
            let existing = self.store.existing_event_ids(user_id).await?;
            let fresh: Vec<NewActivity> = others
                .into_iter()
                .filter(|c| !existing.contains(&c.event_id))
                .collect();
            if !fresh.is_empty() {
                written.extend(self.store.insert_activities(&fresh).await?);
            }
        }

        Ok(written)
    }
}
