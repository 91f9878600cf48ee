// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Issue and pull request fetcher.
//!
//! Runs independently of the commit pipeline. Organizations get every item
//! updated in the window (`org:`); users get every item they are involved in
//! (`involves:`: authored, assigned, mentioned, commented or reviewed) that
//! was updated in the window.

use crate::error::AppError;
use crate::models::{Actor, ActorKind, IssueKind, IssueOrPr, RepositoryInfo, RepositoryRef};
use crate::services::github::{GitHubClient, IssueSearchItem, PER_PAGE};
use crate::time_utils::format_search_timestamp;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// GitHub search returns at most 1000 results (10 pages of 100).
const MAX_SEARCH_PAGES: u32 = 10;

/// Search query for the actor's issues and pull requests since `since`.
pub fn issue_search_query(actor: &Actor, since: DateTime<Utc>) -> String {
    let qualifier = match actor.kind {
        ActorKind::Organization => "org",
        ActorKind::User => "involves",
    };
    format!(
        "{}:{} updated:>={}",
        qualifier,
        actor.login,
        format_search_timestamp(since)
    )
}

/// Fetch every issue and pull request matching the actor's search query.
pub async fn fetch_issues_and_prs(
    github: &GitHubClient,
    actor: &Actor,
    since: DateTime<Utc>,
) -> Result<Vec<IssueOrPr>, AppError> {
    let query = issue_search_query(actor, since);
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for page in 1..=MAX_SEARCH_PAGES {
        let response = github.search_issues(&query, page).await?;
        let page_len = response.items.len();

        for item in &response.items {
            if !seen.insert(item.id) {
                continue;
            }
            match to_issue_or_pr(item) {
                Some(converted) => items.push(converted),
                None => tracing::warn!(
                    id = item.id,
                    url = %item.html_url,
                    "Search result without a resolvable repository, skipping"
                ),
            }
        }

        if page_len < PER_PAGE as usize || seen.len() as u64 >= response.total_count {
            break;
        }
    }

    tracing::info!(
        login = %actor.login,
        query = %query,
        count = items.len(),
        "Issues and pull requests fetched"
    );
    Ok(items)
}

/// Convert a search result, classifying it as PR when it carries
/// pull-request fields. The repository comes from the nested repository
/// object when present, otherwise from the repository API URL.
pub fn to_issue_or_pr(item: &IssueSearchItem) -> Option<IssueOrPr> {
    let repo = item
        .repository
        .as_ref()
        .and_then(|r| RepositoryRef::parse(&r.full_name))
        .or_else(|| {
            item.repository_url
                .as_deref()
                .and_then(RepositoryRef::from_reference)
        })?;

    let kind = if item.pull_request.as_ref().is_some_and(|pr| !pr.is_null()) {
        IssueKind::Pr
    } else {
        IssueKind::Issue
    };

    Some(IssueOrPr {
        id: item.id,
        number: item.number,
        title: item.title.clone(),
        state: item.state.clone(),
        created_at: item.created_at,
        updated_at: item.updated_at,
        url: item.html_url.clone(),
        repository: RepositoryInfo::from(&repo),
        kind,
    })
}
