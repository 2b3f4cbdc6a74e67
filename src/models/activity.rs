// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! GitHub activity model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel repository name used for platform-level contribution summaries,
/// which are not tied to any single repository.
pub const CONTRIBUTION_REPOSITORY: &str = "github-contributions";

/// Kind of activity observed on GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// A contribution-calendar day summary.
    Contribution,
    /// A single commit.
    Commit,
    /// A pull request.
    PullRequest,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Contribution => "contribution",
            ActivityType::Commit => "commit",
            ActivityType::PullRequest => "pull_request",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored activity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Store-assigned identifier (also used as document ID)
    pub id: String,
    /// Owning user ID
    pub user_id: String,
    /// Activity kind
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Repository name (or the contribution sentinel)
    pub repository: String,
    /// Display title (commit message, PR title, contribution summary)
    pub title: String,
    /// Optional display description
    pub description: Option<String>,
    /// Link to the activity on GitHub
    pub url: String,
    /// Deterministic dedup key derived from the activity's natural identity
    pub event_id: String,
    /// The activity's own timestamp (not ingestion time)
    pub created_at: DateTime<Utc>,
    /// Day total, populated only for contribution rows
    pub contribution_count: Option<u32>,
}

/// Candidate activity produced by the normalizer, before the store assigns an ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    pub user_id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub repository: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub event_id: String,
    pub created_at: DateTime<Utc>,
    pub contribution_count: Option<u32>,
}

impl NewActivity {
    /// Attach a store-assigned ID, producing the persisted form.
    pub fn into_activity(self, id: String) -> Activity {
        Activity {
            id,
            user_id: self.user_id,
            activity_type: self.activity_type,
            repository: self.repository,
            title: self.title,
            description: self.description,
            url: self.url,
            event_id: self.event_id,
            created_at: self.created_at,
            contribution_count: self.contribution_count,
        }
    }
}
