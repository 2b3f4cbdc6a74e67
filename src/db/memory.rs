// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store for tests and local development.
//!
//! Implements the same dedup semantics as the Firestore store: inserts
//! conflicting on `(user_id, event_id)` are silently skipped.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::{ActivityQuery, ActivityStore};
use crate::error::AppError;
use crate::models::{Activity, ActivityType, NewActivity, User};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    activities: Vec<Activity>,
    next_id: u64,
}

/// Mutex-guarded in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user (tests only; the sync engine never writes users).
    pub fn put_user(&self, user: User) {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.users.retain(|u| u.id != user.id);
        inner.users.push(user);
    }

    /// Total stored row count, across all users.
    pub fn activity_count(&self) -> usize {
        self.inner.lock().expect("memory store poisoned").activities.len()
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn get_activity(&self, user_id: &str, id: &str) -> Result<Option<Activity>, AppError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .activities
            .iter()
            .find(|a| a.id == id && a.user_id == user_id)
            .cloned())
    }

    async fn existing_event_ids(&self, user_id: &str) -> Result<HashSet<String>, AppError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.event_id.clone())
            .collect())
    }

    async fn delete_activities(
        &self,
        user_id: &str,
        activity_type: ActivityType,
    ) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        let before = inner.activities.len();
        inner
            .activities
            .retain(|a| !(a.user_id == user_id && a.activity_type == activity_type));
        Ok((before - inner.activities.len()) as u64)
    }

    async fn insert_activities(
        &self,
        candidates: &[NewActivity],
    ) -> Result<Vec<Activity>, AppError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        let mut inserted = Vec::new();

        for candidate in candidates {
            let exists = inner.activities.iter().any(|a| {
                a.user_id == candidate.user_id && a.event_id == candidate.event_id
            });
            if exists {
                continue;
            }
            inner.next_id += 1;
            let activity = candidate.clone().into_activity(inner.next_id.to_string());
            inner.activities.push(activity.clone());
            inserted.push(activity);
        }

        Ok(inserted)
    }

    async fn query_activities(
        &self,
        user_id: &str,
        query: &ActivityQuery,
    ) -> Result<Vec<Activity>, AppError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let mut rows: Vec<Activity> = inner
            .activities
            .iter()
            .filter(|a| a.user_id == user_id && query.matches(a))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candidate(user_id: &str, event_id: &str) -> NewActivity {
        NewActivity {
            user_id: user_id.to_string(),
            activity_type: ActivityType::Commit,
            repository: "octo/repo".to_string(),
            title: "fix build".to_string(),
            description: None,
            url: "https://github.com/octo/repo/commit/abc".to_string(),
            event_id: event_id.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            contribution_count: None,
        }
    }

    #[tokio::test]
    async fn insert_skips_conflicting_event_ids() {
        let store = MemoryStore::new();
        let candidates = vec![candidate("u1", "commit-abc"), candidate("u1", "commit-abc")];

        let inserted = store.insert_activities(&candidates).await.unwrap();

        assert_eq!(inserted.len(), 1);
        assert_eq!(store.activity_count(), 1);
    }

    #[tokio::test]
    async fn same_event_id_allowed_for_different_users() {
        let store = MemoryStore::new();
        let candidates = vec![candidate("u1", "commit-abc"), candidate("u2", "commit-abc")];

        let inserted = store.insert_activities(&candidates).await.unwrap();

        assert_eq!(inserted.len(), 2);
    }

    #[tokio::test]
    async fn get_activity_is_scoped_to_the_owner() {
        let store = MemoryStore::new();
        let inserted = store
            .insert_activities(&[candidate("u1", "commit-abc")])
            .await
            .unwrap();
        let id = inserted[0].id.clone();

        assert!(store.get_activity("u1", &id).await.unwrap().is_some());
        assert!(store.get_activity("u2", &id).await.unwrap().is_none());
        assert!(store.get_activity("u1", "unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_orders_newest_first() {
        let store = MemoryStore::new();
        let mut older = candidate("u1", "commit-old");
        older.created_at = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let newer = candidate("u1", "commit-new");

        store.insert_activities(&[older, newer]).await.unwrap();
        let rows = store
            .query_activities("u1", &ActivityQuery::default())
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].event_id, "commit-new");
        assert_eq!(rows[1].event_id, "commit-old");
    }
}
