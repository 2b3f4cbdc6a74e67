// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub API client for fetching user activity.
//!
//! Two fetch variants are supported:
//! - REST event list (`GET /users/{username}/events`)
//! - GraphQL contribution/commit/pull-request graph
//!
//! Which one drives the sync pipeline is a config choice; both feed the
//! same normalizer through the [`RemotePayload`] union.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{Config, SyncSource};
use crate::error::AppError;

/// Remote source of user activity, keyed by username and credential.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn fetch_activity(
        &self,
        username: &str,
        access_token: &str,
    ) -> Result<RemotePayload, AppError>;
}

/// One remote fetch result. The payload shape varies by source variant;
/// the normalizer handles both.
#[derive(Debug, Clone)]
pub enum RemotePayload {
    /// Discrete events from the REST API.
    Events(Vec<GithubEvent>),
    /// Nested contribution/commit/PR graph from the GraphQL API.
    Graph(ContributionGraph),
}

/// GitHub API client.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    graphql_url: String,
    sync_source: SyncSource,
}

const CONTRIBUTIONS_QUERY: &str = r#"
query($login: String!) {
  user(login: $login) {
    contributionsCollection {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            date
            contributionCount
          }
        }
      }
    }
    repositories(first: 30, orderBy: {field: PUSHED_AT, direction: DESC}, ownerAffiliations: OWNER) {
      nodes {
        name
        defaultBranchRef {
          target {
            ... on Commit {
              history(first: 30) {
                nodes {
                  committedDate
                  message
                  url
                  author { name email }
                }
              }
            }
          }
        }
        pullRequests(first: 30, states: [OPEN, MERGED, CLOSED]) {
          nodes {
            title
            url
            createdAt
            repository { name }
          }
        }
      }
    }
  }
}"#;

impl GithubClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.github_api_url.clone(),
            graphql_url: config.github_graphql_url.clone(),
            sync_source: config.sync_source,
        }
    }

    /// Fetch the user's public event list (REST variant).
    pub async fn fetch_events(
        &self,
        access_token: &str,
        username: &str,
    ) -> Result<Vec<GithubEvent>, AppError> {
        let url = format!("{}/users/{}/events", self.api_url, username);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("token {}", access_token))
            .header("User-Agent", "octotrack")
            .send()
            .await
            .map_err(|e| AppError::RemoteApi(e.to_string()))?;

        self.check_response_json(response, username).await
    }

    /// Fetch the contribution graph (GraphQL variant).
    pub async fn fetch_contribution_graph(
        &self,
        access_token: &str,
        username: &str,
    ) -> Result<ContributionGraph, AppError> {
        let body = serde_json::json!({
            "query": CONTRIBUTIONS_QUERY,
            "variables": { "login": username },
        });

        let response = self
            .http
            .post(&self.graphql_url)
            .bearer_auth(access_token)
            .header("User-Agent", "octotrack")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::RemoteApi(e.to_string()))?;

        let graph_response: GraphResponse = self.check_response_json(response, username).await?;

        // GraphQL reports failures as a structured errors array with HTTP 200.
        if let Some(errors) = graph_response.errors {
            if !errors.is_empty() {
                let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
                return Err(AppError::RemoteApi(messages.join("; ")));
            }
        }

        graph_response
            .data
            .and_then(|d| d.user)
            .ok_or_else(|| AppError::RemoteNotFound(username.to_string()))
    }

    /// Check response status, classify failures, and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
        username: &str,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 | 403 => AppError::RemoteAuth(format!("HTTP {}: {}", status, body)),
                404 => AppError::RemoteNotFound(username.to_string()),
                _ => AppError::RemoteApi(format!("HTTP {}: {}", status, body)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::RemoteApi(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl ActivitySource for GithubClient {
    async fn fetch_activity(
        &self,
        username: &str,
        access_token: &str,
    ) -> Result<RemotePayload, AppError> {
        match self.sync_source {
            SyncSource::Events => Ok(RemotePayload::Events(
                self.fetch_events(access_token, username).await?,
            )),
            SyncSource::Graph => Ok(RemotePayload::Graph(
                self.fetch_contribution_graph(access_token, username).await?,
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// REST payload types
// ─────────────────────────────────────────────────────────────────────────────

/// One event from `GET /users/{username}/events`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub repo: EventRepo,
    #[serde(default)]
    pub payload: EventPayload,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRepo {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    pub pull_request: Option<EventPullRequest>,
    pub commits: Option<Vec<EventCommit>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventPullRequest {
    pub title: String,
    pub html_url: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventCommit {
    pub message: String,
    pub url: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphQL payload types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct GraphResponse {
    data: Option<GraphData>,
    errors: Option<Vec<GraphError>>,
}

#[derive(Debug, Clone, Deserialize)]
struct GraphData {
    user: Option<ContributionGraph>,
}

#[derive(Debug, Clone, Deserialize)]
struct GraphError {
    message: String,
}

/// Per-user slice of the GraphQL activity graph.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionGraph {
    #[serde(rename = "contributionsCollection")]
    pub contributions_collection: ContributionsCollection,
    pub repositories: RepositoryConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContributionsCollection {
    #[serde(rename = "contributionCalendar")]
    pub contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContributionCalendar {
    #[serde(rename = "totalContributions")]
    pub total_contributions: u32,
    pub weeks: Vec<ContributionWeek>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContributionWeek {
    #[serde(rename = "contributionDays")]
    pub contribution_days: Vec<ContributionDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContributionDay {
    /// Calendar day, `YYYY-MM-DD`
    pub date: String,
    #[serde(rename = "contributionCount")]
    pub contribution_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConnection {
    pub nodes: Vec<RepositoryNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryNode {
    pub name: String,
    #[serde(rename = "defaultBranchRef")]
    pub default_branch_ref: Option<BranchRef>,
    #[serde(rename = "pullRequests")]
    pub pull_requests: Option<PullRequestConnection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    pub target: Option<BranchTarget>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchTarget {
    pub history: Option<CommitHistory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitHistory {
    pub nodes: Vec<GraphCommit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphCommit {
    #[serde(rename = "committedDate")]
    pub committed_date: String,
    pub message: String,
    pub url: String,
    #[serde(default)]
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestConnection {
    pub nodes: Vec<GraphPullRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphPullRequest {
    pub title: String,
    pub url: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub repository: Option<PullRequestRepo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestRepo {
    pub name: String,
}
