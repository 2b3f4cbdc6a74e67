// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Date/time formatting helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// Render a UTC timestamp as RFC3339 with whole-second precision and a
/// `Z` suffix (`2024-03-10T08:30:00Z`).
pub fn format_utc_rfc3339(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
