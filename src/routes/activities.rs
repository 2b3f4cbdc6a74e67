// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity API routes: listing, stats, analytics, and sync triggers.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Activity, ActivityType};
use crate::services::analytics::{self, ActivityStats, AnalyticsReport, DateWindow};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(list_activities))
        .route("/api/activities/{id}", get(get_activity))
        .route("/api/activities/stats", get(get_stats))
        .route("/api/activities/analytics", get(get_analytics))
        .route("/api/activities/sync", post(sync_activities))
        .route("/api/activities/sync/auto", post(set_auto_sync))
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Trailing window: day, week, month or year
    period: Option<String>,
    /// Filter by activity type
    #[serde(rename = "type")]
    activity_type: Option<ActivityType>,
    /// Filter by repository name
    repository: Option<String>,
}

/// Get the user's activities with optional filtering, newest first.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<Vec<Activity>>> {
    tracing::debug!(
        user_id = %user.user_id,
        period = ?params.period,
        activity_type = ?params.activity_type,
        repository = ?params.repository,
        "Fetching activities"
    );

    let created_after = params
        .period
        .as_deref()
        .and_then(analytics::trailing_duration)
        .map(|d| chrono::Utc::now() - d);

    let query = crate::db::ActivityQuery {
        activity_type: params.activity_type,
        repository: params.repository,
        created_after,
        created_before: None,
    };

    let activities = state.store.query_activities(&user.user_id, &query).await?;
    Ok(Json(activities))
}

/// Get one activity by ID. IDs belonging to other users resolve to 404.
async fn get_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Activity>> {
    let activity = state
        .store
        .get_activity(&user.user_id, &id)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("Activity {} not found", id)))?;
    Ok(Json(activity))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatsQuery {
    period: Option<String>,
}

/// Get total and per-type counts over an optional trailing window.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<ActivityStats>> {
    let start = params
        .period
        .as_deref()
        .and_then(analytics::trailing_duration)
        .map(|d| chrono::Utc::now() - d);

    let stats = state
        .analytics
        .activity_stats(&user.user_id, DateWindow { start, end: None })
        .await?;
    Ok(Json(stats))
}

// ─── Analytics ───────────────────────────────────────────────

#[derive(Deserialize)]
struct AnalyticsQuery {
    period: Option<String>,
    year: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub data: AnalyticsReport,
}

/// Get the contribution timeline, distributions and available years.
async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>> {
    let year = params
        .year
        .as_deref()
        .map(|raw| {
            raw.parse::<i32>().map_err(|_| {
                crate::error::AppError::BadRequest(
                    "Invalid 'year' parameter: must be a number".to_string(),
                )
            })
        })
        .transpose()?;

    let window = analytics::resolve_window(params.period.as_deref(), year, chrono::Utc::now());
    let report = state.analytics.analytics_report(&user.user_id, window).await?;

    Ok(Json(AnalyticsResponse {
        success: true,
        data: report,
    }))
}

// ─── Sync ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SyncResponse {
    pub message: String,
    pub synced_at: String,
    /// The delta actually persisted by this sync
    pub activities: Vec<Activity>,
}

/// Run one on-demand sync for the current user.
async fn sync_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SyncResponse>> {
    let activities = state.sync.sync_now(&user.user_id).await?;

    Ok(Json(SyncResponse {
        message: "Activities synced successfully".to_string(),
        synced_at: format_utc_rfc3339(chrono::Utc::now()),
        activities,
    }))
}

#[derive(Deserialize)]
struct AutoSyncRequest {
    enabled: bool,
}

#[derive(Serialize)]
pub struct AutoSyncResponse {
    pub message: String,
}

/// Enable or disable periodic auto-sync for the current user.
async fn set_auto_sync(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AutoSyncRequest>,
) -> Result<Json<AutoSyncResponse>> {
    if body.enabled {
        if !state.scheduler.enable(&user.user_id).await? {
            return Err(crate::error::AppError::BadRequest(
                "Auto sync requires a stored GitHub access token".to_string(),
            ));
        }
        Ok(Json(AutoSyncResponse {
            message: "Auto sync enabled successfully".to_string(),
        }))
    } else {
        if !state.scheduler.disable(&user.user_id) {
            return Err(crate::error::AppError::BadRequest(
                "Auto sync was not enabled".to_string(),
            ));
        }
        Ok(Json(AutoSyncResponse {
            message: "Auto sync disabled successfully".to_string(),
        }))
    }
}
