// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Commit fetcher.
//!
//! Fetches every branch's history since the window start for one
//! repository, filters by author for user actors, and classifies commits
//! into default-branch and other-branch buckets.

use crate::error::AppError;
use crate::models::{Actor, CommitBuckets, EnrichedCommit, RepositoryInfo, RepositoryRef};
use crate::services::github::{
    Branch, BranchHistoryData, CommitHistory, GitHubClient, RepositoryHistory,
    RepositoryHistoryData,
};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};

/// Cursor pages followed per branch (100 commits each).
const MAX_HISTORY_PAGES: usize = 10;

const REPOSITORY_HISTORY_QUERY: &str = r#"
query RepositoryHistory($owner: String!, $name: String!, $since: GitTimestamp!) {
  repository(owner: $owner, name: $name) {
    name
    nameWithOwner
    defaultBranchRef { name }
    refs(refPrefix: "refs/heads/", first: 100) {
      nodes {
        name
        target {
          ... on Commit {
            history(first: 100, since: $since) {
              pageInfo { hasNextPage endCursor }
              nodes {
                oid
                messageHeadline
                committedDate
                additions
                deletions
                url
                author { name user { login } }
              }
            }
          }
        }
      }
    }
  }
}
"#;

const BRANCH_HISTORY_QUERY: &str = r#"
query BranchHistory($owner: String!, $name: String!, $qualifiedName: String!, $since: GitTimestamp!, $cursor: String!) {
  repository(owner: $owner, name: $name) {
    ref(qualifiedName: $qualifiedName) {
      name
      target {
        ... on Commit {
          history(first: 100, since: $since, after: $cursor) {
            pageInfo { hasNextPage endCursor }
            nodes {
              oid
              messageHeadline
              committedDate
              additions
              deletions
              url
              author { name user { login } }
            }
          }
        }
      }
    }
  }
}
"#;

/// Fetch one repository's commits since `since`, bucketed by branch kind.
pub async fn fetch_repo_commits(
    github: &GitHubClient,
    repo: &RepositoryRef,
    actor: &Actor,
    since: DateTime<Utc>,
) -> Result<CommitBuckets, AppError> {
    let variables = serde_json::json!({
        "owner": repo.owner(),
        "name": repo.name(),
        "since": format_utc_rfc3339(since),
    });

    let data: RepositoryHistoryData = github.graphql(REPOSITORY_HISTORY_QUERY, variables).await?;
    let mut history = data
        .repository
        .ok_or_else(|| AppError::NotFound(format!("Repository {}", repo)))?;

    for branch in history.refs.nodes.iter_mut() {
        follow_branch_history(github, repo, branch, since).await?;
    }

    let buckets = classify_commits(&history, actor);
    tracing::debug!(
        repo = %repo,
        default_branch = buckets.default_branch.len(),
        other_branches = buckets.other_branches.len(),
        "Repository commits fetched"
    );
    Ok(buckets)
}

/// Append the remaining history pages of a branch, up to the page cap.
async fn follow_branch_history(
    github: &GitHubClient,
    repo: &RepositoryRef,
    branch: &mut Branch,
    since: DateTime<Utc>,
) -> Result<(), AppError> {
    let qualified_name = format!("refs/heads/{}", branch.name);
    let Some(history) = branch.target.as_mut().and_then(|t| t.history.as_mut()) else {
        return Ok(());
    };

    let mut pages = 1;
    while let Some(cursor) = next_cursor(history) {
        if pages >= MAX_HISTORY_PAGES {
            tracing::warn!(
                repo = %repo,
                branch = %qualified_name,
                "Branch history truncated at page limit"
            );
            break;
        }

        let variables = serde_json::json!({
            "owner": repo.owner(),
            "name": repo.name(),
            "qualifiedName": qualified_name,
            "since": format_utc_rfc3339(since),
            "cursor": cursor,
        });
        let data: BranchHistoryData = github.graphql(BRANCH_HISTORY_QUERY, variables).await?;

        let page = data
            .repository
            .and_then(|r| r.branch_ref)
            .and_then(|b| b.target)
            .and_then(|t| t.history);
        let Some(page) = page else {
            break;
        };

        history.nodes.extend(page.nodes);
        history.page_info = page.page_info;
        pages += 1;
    }

    Ok(())
}

fn next_cursor(history: &CommitHistory) -> Option<String> {
    history
        .page_info
        .as_ref()
        .filter(|info| info.has_next_page)
        .and_then(|info| info.end_cursor.clone())
}

/// Filter and classify a repository's branch histories.
///
/// User actors keep only commits whose author login matches theirs
/// (case-insensitive); organizations keep everything. A commit found on
/// several branches is placed once per branch.
pub fn classify_commits(history: &RepositoryHistory, actor: &Actor) -> CommitBuckets {
    let default_branch = history.default_branch_ref.as_ref().map(|b| b.name.as_str());
    let repository = RepositoryInfo {
        name: history.name.clone(),
        name_with_owner: history.name_with_owner.clone(),
    };

    let mut buckets = CommitBuckets::default();
    for branch in &history.refs.nodes {
        let Some(commits) = branch.target.as_ref().and_then(|t| t.history.as_ref()) else {
            continue;
        };
        let is_default_branch = default_branch == Some(branch.name.as_str());

        for node in &commits.nodes {
            if !actor.owns_commit(node.author_login()) {
                continue;
            }

            buckets.push(EnrichedCommit {
                oid: node.oid.clone(),
                message_headline: node.message_headline.clone(),
                committed_date: node.committed_date,
                additions: node.additions,
                deletions: node.deletions,
                url: node.url.clone(),
                author_login: node.author_login().map(str::to_string),
                author_name: node.author.as_ref().and_then(|a| a.name.clone()),
                repository: repository.clone(),
                branch: branch.name.clone(),
                is_default_branch,
            });
        }
    }

    buckets
}
