// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only aggregation over persisted activity rows.
//!
//! Produces the contribution timeline, repository and time-pattern
//! distributions, and summary counts, bounded by a period/year window.
//! Never talks to the remote source.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::db::{ActivityQuery, ActivityStore};
use crate::error::AppError;
use crate::models::{Activity, ActivityType};

/// Resolved date bounds for a query. `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Resolve a `(period, year)` filter into date bounds.
///
/// Precedence: `all` means unbounded; `year` with an explicit year means
/// that calendar year (UTC); any other recognized period means a trailing
/// constant-length window; an unrecognized or missing period falls back to
/// the trailing 365 days. Windows are calendar-naive by design: "month" is
/// always 30 days, "year" always 365.
pub fn resolve_window(period: Option<&str>, year: Option<i32>, now: DateTime<Utc>) -> DateWindow {
    match period {
        Some(p) if p.eq_ignore_ascii_case("all") => DateWindow::default(),
        Some(p) if p.eq_ignore_ascii_case("year") && year.is_some() => {
            let y = year.expect("checked above");
            let start = Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).single();
            let end = Utc.with_ymd_and_hms(y, 12, 31, 23, 59, 59).single();
            DateWindow { start, end }
        }
        Some(p) => {
            let duration = trailing_duration(p).unwrap_or_else(|| Duration::days(365));
            DateWindow {
                start: Some(now - duration),
                end: None,
            }
        }
        None => DateWindow {
            start: Some(now - Duration::days(365)),
            end: None,
        },
    }
}

/// Fixed trailing durations for the named periods.
pub fn trailing_duration(period: &str) -> Option<Duration> {
    match period.to_ascii_lowercase().as_str() {
        "day" => Some(Duration::hours(24)),
        "week" => Some(Duration::days(7)),
        "month" => Some(Duration::days(30)),
        "year" => Some(Duration::days(365)),
        _ => None,
    }
}

/// One timeline point: summed contribution count at a `created_at` bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub date: DateTime<Utc>,
    pub count: u32,
}

/// Count of activities in one repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryCount {
    pub repository: String,
    pub count: u32,
}

/// Row count at a `created_at` bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucket {
    pub date: DateTime<Utc>,
    pub count: u32,
}

/// Count of activities of one type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub count: u32,
}

/// Full analytics payload for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub timeline: Vec<TimelineEntry>,
    pub repository_distribution: Vec<RepositoryCount>,
    pub time_pattern: Vec<TimeBucket>,
    /// Distinct calendar years among contribution rows, newest first
    pub available_years: Vec<i32>,
}

/// Summary counts for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityStats {
    pub total: u32,
    pub by_type: Vec<TypeCount>,
}

/// Aggregation queries over the store.
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn ActivityStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    /// Chronological `{date, count}` timeline over contribution rows.
    pub async fn contribution_timeline(
        &self,
        user_id: &str,
        window: DateWindow,
    ) -> Result<Vec<TimelineEntry>, AppError> {
        let rows = self.contributions_in(user_id, window).await?;
        Ok(timeline_from(&rows))
    }

    /// Timeline, distributions and available years in one report.
    pub async fn analytics_report(
        &self,
        user_id: &str,
        window: DateWindow,
    ) -> Result<AnalyticsReport, AppError> {
        let rows = self.contributions_in(user_id, window).await?;

        // Available years span all of the user's contribution rows,
        // regardless of the requested window.
        let all_contributions = self.contributions_in(user_id, DateWindow::default()).await?;

        Ok(AnalyticsReport {
            timeline: timeline_from(&rows),
            repository_distribution: repository_distribution(&rows),
            time_pattern: time_pattern(&rows),
            available_years: available_years(&all_contributions),
        })
    }

    /// Total and per-type counts within the window, all activity types.
    pub async fn activity_stats(
        &self,
        user_id: &str,
        window: DateWindow,
    ) -> Result<ActivityStats, AppError> {
        let query = ActivityQuery {
            created_after: window.start,
            created_before: window.end,
            ..Default::default()
        };
        let rows = self.store.query_activities(user_id, &query).await?;

        let mut counts: HashMap<ActivityType, u32> = HashMap::new();
        for row in &rows {
            *counts.entry(row.activity_type).or_insert(0) += 1;
        }
        let mut by_type: Vec<TypeCount> = counts
            .into_iter()
            .map(|(activity_type, count)| TypeCount {
                activity_type,
                count,
            })
            .collect();
        by_type.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| {
            a.activity_type.as_str().cmp(b.activity_type.as_str())
        }));

        Ok(ActivityStats {
            total: rows.len() as u32,
            by_type,
        })
    }

    async fn contributions_in(
        &self,
        user_id: &str,
        window: DateWindow,
    ) -> Result<Vec<Activity>, AppError> {
        let query = ActivityQuery {
            activity_type: Some(ActivityType::Contribution),
            created_after: window.start,
            created_before: window.end,
            ..Default::default()
        };
        self.store.query_activities(user_id, &query).await
    }
}

/// Sum `contribution_count` per `created_at`, ascending.
fn timeline_from(rows: &[Activity]) -> Vec<TimelineEntry> {
    let mut buckets: BTreeMap<DateTime<Utc>, u32> = BTreeMap::new();
    for row in rows {
        *buckets.entry(row.created_at).or_insert(0) += row.contribution_count.unwrap_or(0);
    }
    buckets
        .into_iter()
        .map(|(date, count)| TimelineEntry { date, count })
        .collect()
}

/// Row counts per repository, largest first.
fn repository_distribution(rows: &[Activity]) -> Vec<RepositoryCount> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for row in rows {
        *counts.entry(row.repository.as_str()).or_insert(0) += 1;
    }
    let mut distribution: Vec<RepositoryCount> = counts
        .into_iter()
        .map(|(repository, count)| RepositoryCount {
            repository: repository.to_string(),
            count,
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.repository.cmp(&b.repository)));
    distribution
}

/// Row counts per `created_at` bucket, ascending.
fn time_pattern(rows: &[Activity]) -> Vec<TimeBucket> {
    let mut buckets: BTreeMap<DateTime<Utc>, u32> = BTreeMap::new();
    for row in rows {
        *buckets.entry(row.created_at).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|(date, count)| TimeBucket { date, count })
        .collect()
}

/// Distinct calendar years, descending.
fn available_years(rows: &[Activity]) -> Vec<i32> {
    let years: BTreeSet<i32> = rows.iter().map(|r| r.created_at.year()).collect();
    years.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
    }

    fn contribution(date: DateTime<Utc>, count: u32) -> Activity {
        Activity {
            id: format!("c-{}", date.timestamp()),
            user_id: "u1".to_string(),
            activity_type: ActivityType::Contribution,
            repository: "github-contributions".to_string(),
            title: format!("{} contributions", count),
            description: None,
            url: "https://github.com/octocat".to_string(),
            event_id: format!("contribution-{}", date.format("%Y-%m-%d")),
            created_at: date,
            contribution_count: Some(count),
        }
    }

    #[test]
    fn all_period_is_unbounded() {
        let window = resolve_window(Some("all"), None, Utc::now());
        assert_eq!(window, DateWindow::default());
    }

    #[test]
    fn explicit_year_uses_calendar_bounds() {
        let window = resolve_window(Some("year"), Some(2022), Utc::now());
        assert_eq!(window.start, Some(at(2022, 1, 1)));
        assert_eq!(
            window.end,
            Some(Utc.with_ymd_and_hms(2022, 12, 31, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn named_periods_use_fixed_trailing_durations() {
        let now = at(2024, 6, 1);

        let week = resolve_window(Some("week"), None, now);
        assert_eq!(week.start, Some(now - Duration::days(7)));
        assert_eq!(week.end, None);

        let day = resolve_window(Some("day"), None, now);
        assert_eq!(day.start, Some(now - Duration::hours(24)));

        // "month" is a constant 30 days, not a calendar month
        let month = resolve_window(Some("month"), None, now);
        assert_eq!(month.start, Some(now - Duration::days(30)));

        // "year" without an explicit year means trailing 365 days
        let year = resolve_window(Some("year"), None, now);
        assert_eq!(year.start, Some(now - Duration::days(365)));
    }

    #[test]
    fn missing_or_unknown_period_defaults_to_trailing_year() {
        let now = at(2024, 6, 1);
        assert_eq!(
            resolve_window(None, None, now).start,
            Some(now - Duration::days(365))
        );
        assert_eq!(
            resolve_window(Some("fortnight"), None, now).start,
            Some(now - Duration::days(365))
        );
    }

    #[test]
    fn timeline_sums_counts_per_bucket_ascending() {
        let rows = vec![
            contribution(at(2024, 1, 2), 3),
            contribution(at(2024, 1, 1), 5),
            contribution(at(2024, 1, 2), 2),
        ];

        let timeline = timeline_from(&rows);

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].date, at(2024, 1, 1));
        assert_eq!(timeline[0].count, 5);
        assert_eq!(timeline[1].date, at(2024, 1, 2));
        assert_eq!(timeline[1].count, 5);
    }

    #[test]
    fn available_years_are_distinct_descending() {
        let rows = vec![
            contribution(at(2022, 5, 1), 1),
            contribution(at(2024, 5, 1), 1),
            contribution(at(2022, 6, 1), 1),
            contribution(at(2023, 5, 1), 1),
        ];

        assert_eq!(available_years(&rows), vec![2024, 2023, 2022]);
    }

    #[test]
    fn repository_distribution_sorts_by_count() {
        let mut a = contribution(at(2024, 1, 1), 1);
        a.repository = "octo/a".to_string();
        let mut b1 = contribution(at(2024, 1, 2), 1);
        b1.repository = "octo/b".to_string();
        let mut b2 = contribution(at(2024, 1, 3), 1);
        b2.repository = "octo/b".to_string();

        let distribution = repository_distribution(&[a, b1, b2]);

        assert_eq!(distribution[0].repository, "octo/b");
        assert_eq!(distribution[0].count, 2);
        assert_eq!(distribution[1].repository, "octo/a");
    }
}
