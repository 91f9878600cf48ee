// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Issues and pull requests returned by search.

use crate::models::RepositoryInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminator between issues and pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Issue,
    Pr,
}

/// An issue or pull request the actor was involved with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueOrPr {
    pub id: u64,
    pub number: u64,
    pub title: String,
    /// `open` or `closed`; merged PRs report `closed`
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Canonical web URL
    pub url: String,
    pub repository: RepositoryInfo,
    #[serde(rename = "type")]
    pub kind: IssueKind,
}

impl IssueOrPr {
    pub fn is_pr(&self) -> bool {
        self.kind == IssueKind::Pr
    }
}
