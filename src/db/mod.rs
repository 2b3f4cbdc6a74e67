// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! The sync engine and aggregator consume the [`ActivityStore`] trait;
//! production runs against Firestore, tests and local development against
//! the in-memory store.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{Activity, ActivityType, NewActivity, User};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ACTIVITIES: &str = "activities";
}

/// Filter for activity queries. All fields are optional and combine with AND.
#[derive(Debug, Clone, Default)]
pub struct ActivityQuery {
    pub activity_type: Option<ActivityType>,
    pub repository: Option<String>,
    /// Inclusive lower bound on `created_at`
    pub created_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub created_before: Option<DateTime<Utc>>,
}

/// Persistence operations consumed by the sync engine and the aggregator.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Credential lookup before a sync. The engine never writes users.
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError>;

    /// Fetch one activity by ID. Scoped to the owning user: an ID that
    /// exists under another user resolves to `None`.
    async fn get_activity(&self, user_id: &str, id: &str)
        -> Result<Option<Activity>, AppError>;

    /// The set of `event_id`s already persisted for this user.
    async fn existing_event_ids(&self, user_id: &str) -> Result<HashSet<String>, AppError>;

    /// Delete all rows of one type for a user. Returns the number deleted.
    async fn delete_activities(
        &self,
        user_id: &str,
        activity_type: ActivityType,
    ) -> Result<u64, AppError>;

    /// Insert candidates, silently skipping any whose `(user_id, event_id)`
    /// already exists. Returns only the rows actually inserted.
    async fn insert_activities(
        &self,
        candidates: &[NewActivity],
    ) -> Result<Vec<Activity>, AppError>;

    /// Query a user's activities, newest first.
    async fn query_activities(
        &self,
        user_id: &str,
        query: &ActivityQuery,
    ) -> Result<Vec<Activity>, AppError>;
}

impl ActivityQuery {
    /// Whether a row passes the type/repository/date-range filter.
    pub fn matches(&self, activity: &Activity) -> bool {
        if let Some(t) = self.activity_type {
            if activity.activity_type != t {
                return false;
            }
        }
        if let Some(repo) = &self.repository {
            if &activity.repository != repo {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if activity.created_at < after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if activity.created_at > before {
                return false;
            }
        }
        true
    }
}
