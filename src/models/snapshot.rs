// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shareable snapshot of a completed aggregation run.

use crate::models::{EnrichedCommit, IssueOrPr};
use crate::time_utils::format_utc_date;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted bundle of an aggregation run plus its summary.
///
/// Keyed by `actor-startDate-to-endDate`; exporting again with the same key
/// overwrites the stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySnapshot {
    /// Composite key (also used as document ID)
    pub id: String,
    /// Actor login
    pub actor: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Generated summary (markdown); empty when none was generated
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub commits: Vec<EnrichedCommit>,
    #[serde(default)]
    pub issues: Vec<IssueOrPr>,
    #[serde(default)]
    pub pull_requests: Vec<IssueOrPr>,
    /// When this snapshot was last written (RFC3339)
    #[serde(default)]
    pub updated_at: String,
}

/// Build the composite snapshot key for an actor and window.
///
/// Clients build this key themselves when exporting; the server stores
/// whatever id the export request carries.
pub fn snapshot_id(actor: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "{}-{}-to-{}",
        actor.to_ascii_lowercase(),
        format_utc_date(start),
        format_utc_date(end)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_snapshot_id_is_stable() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 8, 8, 30, 0).unwrap();

        assert_eq!(
            snapshot_id("Octocat", start, end),
            "octocat-2024-01-01-to-2024-01-08"
        );
        assert_eq!(
            snapshot_id("octocat", start, end),
            snapshot_id("OCTOCAT", start, end)
        );
    }
}
