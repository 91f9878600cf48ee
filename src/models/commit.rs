// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Commit records produced by the commit fetcher.

use crate::models::RepositoryInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit enriched with diff stats, authorship and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedCommit {
    /// Commit hash; unique within one branch's history
    pub oid: String,
    pub message_headline: String,
    pub committed_date: DateTime<Utc>,
    pub additions: u64,
    pub deletions: u64,
    /// Web URL of the commit
    #[serde(default)]
    pub url: String,
    /// GitHub login of the author, if the author maps to an account
    pub author_login: Option<String>,
    /// Git author name
    #[serde(default)]
    pub author_name: Option<String>,
    pub repository: RepositoryInfo,
    pub branch: String,
    /// Whether `branch` was the repository's default branch at fetch time
    #[serde(default)]
    pub is_default_branch: bool,
}

/// Commits split by whether they were found on the default branch.
///
/// The same commit may appear in both buckets when it lives on several
/// branches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitBuckets {
    pub default_branch: Vec<EnrichedCommit>,
    pub other_branches: Vec<EnrichedCommit>,
    /// Repositories whose history could not be fetched
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_repositories: Vec<String>,
}

impl CommitBuckets {
    /// Place a commit into the bucket matching its branch classification.
    pub fn push(&mut self, commit: EnrichedCommit) {
        if commit.is_default_branch {
            self.default_branch.push(commit);
        } else {
            self.other_branches.push(commit);
        }
    }

    /// Merge another set of buckets into this one.
    pub fn extend(&mut self, other: CommitBuckets) {
        self.default_branch.extend(other.default_branch);
        self.other_branches.extend(other.other_branches);
        self.failed_repositories.extend(other.failed_repositories);
    }

    /// Sort both buckets by commit date, newest first.
    pub fn sort_newest_first(&mut self) {
        sort_newest_first(&mut self.default_branch);
        sort_newest_first(&mut self.other_branches);
    }

    pub fn len(&self) -> usize {
        self.default_branch.len() + self.other_branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sort commits by commit date, newest first.
pub fn sort_newest_first(commits: &mut [EnrichedCommit]) {
    commits.sort_by(|a, b| b.committed_date.cmp(&a.committed_date));
}
