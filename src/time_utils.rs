// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format the time between two instants as `H:MM:SS`, or `M:SS` under an hour.
pub fn format_elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let total = (to - from).num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Calendar days (UTC) to request from a daily weather provider.
///
/// Providers need a span of at least one day, so the end is always
/// exactly one day after the day `start` falls on.
pub fn weather_day_span(start: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let day = start.date_naive();
    let next = day + Duration::days(1);
    (day, next)
}
