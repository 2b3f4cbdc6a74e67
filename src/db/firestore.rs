// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore implementation of the activity store.
//!
//! Activity documents are keyed by `"{user_id}_{event_id}"` (the event ID is
//! URL-encoded), so a conflicting insert surfaces as a data-conflict error
//! and can be skipped silently. Repository and date-range refinements are
//! applied in memory after a per-user query; a user's activity set is
//! bounded by the remote fetch window, so these result sets stay small.

use std::collections::HashSet;

use async_trait::async_trait;
use futures_util::{stream, StreamExt};

use crate::db::{collections, ActivityQuery, ActivityStore};
use crate::error::AppError;
use crate::models::{Activity, ActivityType, NewActivity, User};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore-backed store.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

/// Document ID for an activity row. Encoding the event ID keeps URLs and
/// other punctuation out of the document path.
fn activity_doc_id(user_id: &str, event_id: &str) -> String {
    format!("{}_{}", user_id, urlencoding::encode(event_id))
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    /// Fetch all rows of one user (optionally one type) from Firestore.
    async fn fetch_user_activities(
        &self,
        user_id: &str,
        activity_type: Option<ActivityType>,
    ) -> Result<Vec<Activity>, AppError> {
        let user_id = user_id.to_string();
        let query = self
            .client
            .fluent()
            .select()
            .from(collections::ACTIVITIES);

        let query = if let Some(t) = activity_type {
            query.filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("type").eq(t.as_str()),
                ])
            })
        } else {
            query.filter(move |q| q.field("user_id").eq(user_id.clone()))
        };

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Batch delete documents using transactions.
    async fn batch_delete(&self, doc_ids: &[String], collection: &str) -> Result<(), AppError> {
        for chunk in doc_ids.chunks(BATCH_SIZE) {
            let mut transaction = self
                .client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for doc_id in chunk {
                self.client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl ActivityStore for FirestoreStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_activity(&self, user_id: &str, id: &str) -> Result<Option<Activity>, AppError> {
        let activity: Option<Activity> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Document IDs embed the owning user, but enforce the scope here
        // rather than trusting the ID format.
        Ok(activity.filter(|a| a.user_id == user_id))
    }

    async fn existing_event_ids(&self, user_id: &str) -> Result<HashSet<String>, AppError> {
        let rows = self.fetch_user_activities(user_id, None).await?;
        Ok(rows.into_iter().map(|a| a.event_id).collect())
    }

    async fn delete_activities(
        &self,
        user_id: &str,
        activity_type: ActivityType,
    ) -> Result<u64, AppError> {
        let rows = self.fetch_user_activities(user_id, Some(activity_type)).await?;
        let doc_ids: Vec<String> = rows.iter().map(|a| a.id.clone()).collect();
        let count = doc_ids.len() as u64;

        self.batch_delete(&doc_ids, collections::ACTIVITIES).await?;

        tracing::debug!(user_id, activity_type = %activity_type, count, "Deleted activities");
        Ok(count)
    }

    async fn insert_activities(
        &self,
        candidates: &[NewActivity],
    ) -> Result<Vec<Activity>, AppError> {
        let client = &self.client;

        let results: Vec<Result<Option<Activity>, AppError>> =
            stream::iter(candidates.to_vec())
                .map(|candidate| async move {
                    let doc_id = activity_doc_id(&candidate.user_id, &candidate.event_id);
                    let activity = candidate.into_activity(doc_id.clone());

                    let result: Result<Activity, _> = client
                        .fluent()
                        .insert()
                        .into(collections::ACTIVITIES)
                        .document_id(&doc_id)
                        .object(&activity)
                        .execute()
                        .await;

                    match result {
                        Ok(_) => Ok(Some(activity)),
                        // Document already exists: skip-on-conflict semantics.
                        Err(firestore::errors::FirestoreError::DataConflictError(_)) => {
                            tracing::debug!(
                                user_id = %activity.user_id,
                                event_id = %activity.event_id,
                                "Skipping duplicate activity"
                            );
                            Ok(None)
                        }
                        Err(e) => Err(AppError::Database(e.to_string())),
                    }
                })
                .buffer_unordered(MAX_CONCURRENT_DB_OPS)
                .collect()
                .await;

        let mut inserted = Vec::with_capacity(candidates.len());
        for result in results {
            if let Some(activity) = result? {
                inserted.push(activity);
            }
        }
        Ok(inserted)
    }

    async fn query_activities(
        &self,
        user_id: &str,
        query: &ActivityQuery,
    ) -> Result<Vec<Activity>, AppError> {
        let mut rows = self
            .fetch_user_activities(user_id, query.activity_type)
            .await?;
        rows.retain(|a| query.matches(a));
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
