// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and query windows.

use crate::error::AppError;
use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Largest accepted custom lookback, in days.
pub const MAX_CUSTOM_DAYS: u32 = 365;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a UTC timestamp as a calendar date (`YYYY-MM-DD`).
pub fn format_utc_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a UTC timestamp for GitHub search qualifiers (`2024-01-01T12:00:00+00:00`).
pub fn format_search_timestamp(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
}

/// Lookback presets offered to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Day,
    Week,
    Month,
    Year,
    Custom(u32),
}

impl Timeframe {
    /// Parse a `timeframe` query value plus the optional `days` value used by `custom`.
    ///
    /// A missing timeframe defaults to `week`.
    pub fn parse(timeframe: Option<&str>, days: Option<&str>) -> Result<Self, AppError> {
        match timeframe.map(str::trim).unwrap_or("week") {
            "day" | "24h" => Ok(Timeframe::Day),
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            "year" => Ok(Timeframe::Year),
            "custom" => {
                let raw = days.ok_or_else(|| {
                    AppError::BadRequest("Custom timeframe requires 'days'".to_string())
                })?;
                let days = raw.trim().parse::<u32>().map_err(|_| {
                    AppError::BadRequest(format!("Invalid 'days' value: {}", raw))
                })?;
                if days == 0 || days > MAX_CUSTOM_DAYS {
                    return Err(AppError::BadRequest(format!(
                        "'days' must be between 1 and {}",
                        MAX_CUSTOM_DAYS
                    )));
                }
                Ok(Timeframe::Custom(days))
            }
            other => Err(AppError::BadRequest(format!(
                "Unknown timeframe: {}",
                other
            ))),
        }
    }

    /// Number of days covered by this timeframe.
    pub fn days(self) -> u32 {
        match self {
            Timeframe::Day => 1,
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::Year => 365,
            Timeframe::Custom(days) => days,
        }
    }

    /// The `[since, now]` window ending at `now`.
    pub fn window(self, now: DateTime<Utc>) -> Window {
        Window {
            since: now - Duration::days(i64::from(self.days())),
            until: now,
        }
    }
}

/// Time range bounding all activity queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

/// Human phrase for a window length, used in share metadata.
pub fn timeframe_phrase(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let seconds = (end - start).num_seconds().max(0);
    let days = (seconds + 86_399) / 86_400;

    match days {
        1 => "in the last 24 hours".to_string(),
        7 => "this week".to_string(),
        30 | 31 => "this month".to_string(),
        365 => "this year".to_string(),
        n => format!("the last {} days", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_presets() {
        assert_eq!(Timeframe::parse(None, None).unwrap(), Timeframe::Week);
        assert_eq!(Timeframe::parse(Some("day"), None).unwrap().days(), 1);
        assert_eq!(Timeframe::parse(Some("month"), None).unwrap().days(), 30);
        assert_eq!(Timeframe::parse(Some("year"), None).unwrap().days(), 365);
    }

    #[test]
    fn test_custom_days_validation() {
        assert_eq!(
            Timeframe::parse(Some("custom"), Some("14")).unwrap(),
            Timeframe::Custom(14)
        );
        assert!(Timeframe::parse(Some("custom"), None).is_err());
        assert!(Timeframe::parse(Some("custom"), Some("abc")).is_err());
        assert!(Timeframe::parse(Some("custom"), Some("0")).is_err());
        assert!(Timeframe::parse(Some("custom"), Some("366")).is_err());
        assert!(Timeframe::parse(Some("fortnight"), None).is_err());
    }

    #[test]
    fn test_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap();
        let window = Timeframe::Week.window(now);
        assert_eq!(window.until, now);
        assert_eq!(format_utc_rfc3339(window.since), "2024-03-01T12:00:00Z");
    }

    #[test]
    fn test_timeframe_phrase() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            timeframe_phrase(start, start + Duration::days(1)),
            "in the last 24 hours"
        );
        assert_eq!(timeframe_phrase(start, start + Duration::days(7)), "this week");
        assert_eq!(timeframe_phrase(start, start + Duration::days(30)), "this month");
        assert_eq!(timeframe_phrase(start, start + Duration::days(365)), "this year");
        assert_eq!(
            timeframe_phrase(start, start + Duration::days(14)),
            "the last 14 days"
        );
    }
}
