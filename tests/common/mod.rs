// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use octotrack::config::Config;
use octotrack::db::{ActivityStore, MemoryStore};
use octotrack::error::AppError;
use octotrack::models::{ActivityType, NewActivity, User, CONTRIBUTION_REPOSITORY};
use octotrack::routes::create_router;
use octotrack::services::github::{
    BranchRef, BranchTarget, CommitAuthor, CommitHistory, ContributionCalendar, ContributionDay,
    ContributionGraph, ContributionWeek, ContributionsCollection, GraphCommit, GraphPullRequest,
    PullRequestConnection, RepositoryConnection, RepositoryNode,
};
use octotrack::services::{
    ActivitySource, AnalyticsService, RemotePayload, SyncScheduler, SyncService,
};
use octotrack::AppState;

/// Remote source stub with a swappable payload and failure switch.
pub struct StubSource {
    payload: Mutex<RemotePayload>,
    calls: AtomicUsize,
    fail: AtomicBool,
}

#[allow(dead_code)]
impl StubSource {
    pub fn new(payload: RemotePayload) -> Self {
        Self {
            payload: Mutex::new(payload),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_payload(&self, payload: RemotePayload) {
        *self.payload.lock().unwrap() = payload;
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivitySource for StubSource {
    async fn fetch_activity(
        &self,
        _username: &str,
        _access_token: &str,
    ) -> Result<RemotePayload, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::RemoteApi("stubbed outage".to_string()));
        }
        Ok(self.payload.lock().unwrap().clone())
    }
}

/// A user with a stored credential.
#[allow(dead_code)]
pub fn connected_user(id: &str, username: &str) -> User {
    User {
        id: id.to_string(),
        github_id: format!("gh-{}", id),
        username: username.to_string(),
        access_token: Some("gho_testtoken".to_string()),
    }
}

/// A contribution candidate with an explicit timestamp, for seeding the
/// store directly in window-filtering tests.
#[allow(dead_code)]
pub fn contribution_at(user_id: &str, created_at: DateTime<Utc>, count: u32) -> NewActivity {
    let date = created_at.format("%Y-%m-%d");
    NewActivity {
        user_id: user_id.to_string(),
        activity_type: ActivityType::Contribution,
        repository: CONTRIBUTION_REPOSITORY.to_string(),
        title: format!("{} contributions on {}", count, date),
        description: None,
        url: "https://github.com/octocat".to_string(),
        event_id: format!("contribution-{}", date),
        created_at,
        contribution_count: Some(count),
    }
}

#[allow(dead_code)]
pub fn day(date: &str, count: u32) -> ContributionDay {
    ContributionDay {
        date: date.to_string(),
        contribution_count: count,
    }
}

#[allow(dead_code)]
pub fn authored_commit(url: &str, username: &str, committed: &str) -> GraphCommit {
    GraphCommit {
        committed_date: committed.to_string(),
        message: format!("commit at {}", url),
        url: url.to_string(),
        author: CommitAuthor {
            name: Some(username.to_string()),
            email: Some(format!("{}@users.noreply.github.com", username)),
        },
    }
}

/// Build a graph payload from days, commits and PRs in one repository.
#[allow(dead_code)]
pub fn graph_payload(
    days: Vec<ContributionDay>,
    commits: Vec<GraphCommit>,
    prs: Vec<GraphPullRequest>,
) -> RemotePayload {
    RemotePayload::Graph(ContributionGraph {
        contributions_collection: ContributionsCollection {
            contribution_calendar: ContributionCalendar {
                total_contributions: days.iter().map(|d| d.contribution_count).sum(),
                weeks: vec![ContributionWeek {
                    contribution_days: days,
                }],
            },
        },
        repositories: RepositoryConnection {
            nodes: vec![RepositoryNode {
                name: "octo/widgets".to_string(),
                default_branch_ref: Some(BranchRef {
                    target: Some(BranchTarget {
                        history: Some(CommitHistory { nodes: commits }),
                    }),
                }),
                pull_requests: Some(PullRequestConnection { nodes: prs }),
            }],
        },
    })
}

/// Payload with 2 commits, 1 PR and 3 nonzero contribution days.
#[allow(dead_code)]
pub fn sample_payload(username: &str) -> RemotePayload {
    graph_payload(
        vec![
            day("2024-03-08", 2),
            day("2024-03-09", 0),
            day("2024-03-10", 4),
            day("2024-03-11", 1),
        ],
        vec![
            authored_commit(
                "https://github.com/octo/widgets/commit/a1",
                username,
                "2024-03-10T08:30:00Z",
            ),
            authored_commit(
                "https://github.com/octo/widgets/commit/b2",
                username,
                "2024-03-11T09:15:00Z",
            ),
        ],
        vec![GraphPullRequest {
            title: "Add frobnicator".to_string(),
            url: "https://github.com/octo/widgets/pull/7".to_string(),
            created_at: "2024-03-11T12:00:00Z".to_string(),
            repository: None,
        }],
    )
}

/// Test harness around the router with in-memory store and stubbed remote.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub source: Arc<StubSource>,
    pub signing_key: Vec<u8>,
}

/// Create a test app wired to a `MemoryStore` and a `StubSource`.
#[allow(dead_code)]
pub fn create_test_app(payload: RemotePayload) -> TestApp {
    let config = Config::test_default();
    let signing_key = config.jwt_signing_key.clone();

    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn ActivityStore> = memory.clone();
    let source = Arc::new(StubSource::new(payload));

    let sync = SyncService::new(store.clone(), source.clone());
    let scheduler = SyncScheduler::new(sync.clone(), Duration::from_secs(60 * 60));
    let analytics = AnalyticsService::new(store.clone());

    let state = Arc::new(AppState {
        config,
        store,
        sync,
        scheduler,
        analytics,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        store: memory,
        source,
        signing_key,
    }
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}
