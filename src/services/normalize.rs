// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Normalization of remote payloads into canonical activity candidates.
//!
//! Pure transformation, no side effects. Each candidate carries a
//! deterministic `event_id` derived from its natural identity (commit URL,
//! PR URL, or calendar day), which is what the dedup engine keys on.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{ActivityType, NewActivity, CONTRIBUTION_REPOSITORY};
use crate::services::github::{CommitAuthor, ContributionGraph, GithubEvent, RemotePayload};

/// Convert one remote fetch result into candidate records for reconciliation.
pub fn normalize_payload(
    payload: &RemotePayload,
    user_id: &str,
    username: &str,
) -> Vec<NewActivity> {
    match payload {
        RemotePayload::Events(events) => normalize_events(events, user_id, username),
        RemotePayload::Graph(graph) => normalize_graph(graph, user_id, username),
    }
}

/// Map REST events. Each event yields at most one candidate.
pub fn normalize_events(
    events: &[GithubEvent],
    user_id: &str,
    username: &str,
) -> Vec<NewActivity> {
    let mut candidates = Vec::new();

    for event in events {
        let Some(created_at) = parse_timestamp(&event.created_at) else {
            continue;
        };

        if let Some(pr) = &event.payload.pull_request {
            let created_at = pr
                .created_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(created_at);
            candidates.push(NewActivity {
                user_id: user_id.to_string(),
                activity_type: ActivityType::PullRequest,
                repository: event.repo.name.clone(),
                title: pr.title.clone(),
                description: None,
                url: pr.html_url.clone(),
                event_id: format!("pr-{}", pr.html_url),
                created_at,
                contribution_count: None,
            });
        } else if let Some(commit) = event.payload.commits.as_ref().and_then(|c| c.first()) {
            // The events feed can carry pushes to repositories the user merely
            // collaborates on; only keep commits they authored themselves.
            let authored = commit
                .author
                .as_ref()
                .is_some_and(|a| author_matches(a, username));
            if !authored {
                continue;
            }
            candidates.push(NewActivity {
                user_id: user_id.to_string(),
                activity_type: ActivityType::Commit,
                repository: event.repo.name.clone(),
                title: commit.message.clone(),
                description: None,
                url: commit.url.clone(),
                event_id: format!("commit-{}", commit.url),
                created_at,
                contribution_count: None,
            });
        }
    }

    candidates
}

/// Map the GraphQL graph: one candidate per nonzero contribution day, per
/// authored commit, and per pull request.
pub fn normalize_graph(
    graph: &ContributionGraph,
    user_id: &str,
    username: &str,
) -> Vec<NewActivity> {
    let mut candidates = Vec::new();

    let calendar = &graph.contributions_collection.contribution_calendar;
    for week in &calendar.weeks {
        for day in &week.contribution_days {
            // Days with zero contributions are dropped, not stored as zero rows.
            if day.contribution_count == 0 {
                continue;
            }
            let Some(created_at) = parse_calendar_day(&day.date) else {
                continue;
            };
            candidates.push(NewActivity {
                user_id: user_id.to_string(),
                activity_type: ActivityType::Contribution,
                repository: CONTRIBUTION_REPOSITORY.to_string(),
                title: format!("{} contributions on {}", day.contribution_count, day.date),
                description: None,
                url: format!("https://github.com/{}", username),
                event_id: format!("contribution-{}", day.date),
                created_at,
                contribution_count: Some(day.contribution_count),
            });
        }
    }

    for repo in &graph.repositories.nodes {
        let history = repo
            .default_branch_ref
            .as_ref()
            .and_then(|r| r.target.as_ref())
            .and_then(|t| t.history.as_ref());
        if let Some(history) = history {
            for commit in &history.nodes {
                // Default-branch history is the repository's full history,
                // not a per-author one.
                if !author_matches(&commit.author, username) {
                    continue;
                }
                let Some(created_at) = parse_timestamp(&commit.committed_date) else {
                    continue;
                };
                candidates.push(NewActivity {
                    user_id: user_id.to_string(),
                    activity_type: ActivityType::Commit,
                    repository: repo.name.clone(),
                    title: commit.message.clone(),
                    description: None,
                    url: commit.url.clone(),
                    event_id: format!("commit-{}", commit.url),
                    created_at,
                    contribution_count: None,
                });
            }
        }

        if let Some(prs) = &repo.pull_requests {
            for pr in &prs.nodes {
                let Some(created_at) = parse_timestamp(&pr.created_at) else {
                    continue;
                };
                let repository = pr
                    .repository
                    .as_ref()
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| repo.name.clone());
                candidates.push(NewActivity {
                    user_id: user_id.to_string(),
                    activity_type: ActivityType::PullRequest,
                    repository,
                    title: pr.title.clone(),
                    description: None,
                    url: pr.url.clone(),
                    event_id: format!("pr-{}", pr.url),
                    created_at,
                    contribution_count: None,
                });
            }
        }
    }

    candidates
}

/// Whether a commit author identity matches the owning user, by exact name
/// or email substring.
fn author_matches(author: &CommitAuthor, username: &str) -> bool {
    let by_name = author
        .name
        .as_deref()
        .is_some_and(|n| n.eq_ignore_ascii_case(username));
    let by_email = author
        .email
        .as_deref()
        .is_some_and(|e| e.to_lowercase().contains(&username.to_lowercase()));
    by_name || by_email
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Midnight UTC of a `YYYY-MM-DD` calendar day.
fn parse_calendar_day(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
