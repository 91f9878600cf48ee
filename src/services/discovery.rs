// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Repository discovery.
//!
//! No single GitHub endpoint lists every repository an actor touched, so
//! discovery unions several overlapping signals:
//! - Organizations: the org repository list filtered by push time.
//! - Users: the public event feed, the owned repository list filtered by
//!   push time, and a commit search (surfaces forks and external repos).
//!
//! A failing signal contributes nothing; the result is best-effort.

use crate::error::AppError;
use crate::models::{Actor, ActorKind, RepositoryRef};
use crate::services::github::{GitHubClient, RepoSummary};
use crate::time_utils::format_search_timestamp;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::future::Future;

/// Upper bound on repository listing pages walked per signal.
const MAX_REPO_PAGES: u32 = 10;

/// Discover repositories with activity on or after `since`.
///
/// The returned set may be empty; callers decide whether that is fatal.
pub async fn discover_repositories(
    github: &GitHubClient,
    actor: &Actor,
    since: DateTime<Utc>,
) -> BTreeSet<RepositoryRef> {
    let repos = match actor.kind {
        ActorKind::Organization => discover_for_org(github, &actor.login, since).await,
        ActorKind::User => discover_for_user(github, &actor.login, since).await,
    };

    tracing::info!(
        login = %actor.login,
        kind = ?actor.kind,
        count = repos.len(),
        "Repository discovery complete"
    );
    repos
}

async fn discover_for_org(
    github: &GitHubClient,
    org: &str,
    since: DateTime<Utc>,
) -> BTreeSet<RepositoryRef> {
    let listed = collect_pushed_since(since, move |page| github.list_org_repos(org, page)).await;
    tolerate("org_repos", org, listed).into_iter().collect()
}

async fn discover_for_user(
    github: &GitHubClient,
    user: &str,
    since: DateTime<Utc>,
) -> BTreeSet<RepositoryRef> {
    let (events, owned, searched) = tokio::join!(
        repos_from_events(github, user, since),
        collect_pushed_since(since, move |page| github.list_user_repos(user, page)),
        repos_from_commit_search(github, user, since),
    );

    union_signals([
        tolerate("events", user, events),
        tolerate("owned_repos", user, owned),
        tolerate("commit_search", user, searched),
    ])
}

/// Merge the contributions of several signals into one deduplicated set.
pub fn union_signals<I>(signals: I) -> BTreeSet<RepositoryRef>
where
    I: IntoIterator<Item = Vec<RepositoryRef>>,
{
    signals.into_iter().flatten().collect()
}

/// Keep a signal's result, or log its failure and contribute nothing.
fn tolerate(
    signal: &str,
    login: &str,
    result: Result<Vec<RepositoryRef>, AppError>,
) -> Vec<RepositoryRef> {
    match result {
        Ok(repos) => {
            tracing::debug!(signal, login, count = repos.len(), "Discovery signal collected");
            repos
        }
        Err(e) => {
            tracing::warn!(signal, login, error = %e, "Discovery signal failed, ignoring");
            Vec::new()
        }
    }
}

/// Walk a pushed-desc repository listing, keeping repos pushed on/after `since`.
///
/// Stops at the first empty page. Because listings are ordered by push
/// time, a page containing a stale repository also ends the walk; the
/// filter alone decides what is kept.
async fn collect_pushed_since<F, Fut>(
    since: DateTime<Utc>,
    fetch_page: F,
) -> Result<Vec<RepositoryRef>, AppError>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Vec<RepoSummary>, AppError>>,
{
    let mut repos = Vec::new();

    for page in 1..=MAX_REPO_PAGES {
        let listing = fetch_page(page).await?;
        if listing.is_empty() {
            break;
        }

        let (fresh, saw_stale) = pushed_since(&listing, since);
        repos.extend(fresh);
        if saw_stale {
            break;
        }
    }

    Ok(repos)
}

/// Filter a listing page by push time.
///
/// Returns the repositories pushed on/after `since` and whether any entry
/// on the page was older.
pub fn pushed_since(listing: &[RepoSummary], since: DateTime<Utc>) -> (Vec<RepositoryRef>, bool) {
    let mut saw_stale = false;
    let fresh = listing
        .iter()
        .filter(|repo| {
            let fresh = repo.pushed_at.is_some_and(|pushed| pushed >= since);
            saw_stale |= !fresh;
            fresh
        })
        .filter_map(|repo| RepositoryRef::parse(&repo.full_name))
        .collect();
    (fresh, saw_stale)
}

async fn repos_from_events(
    github: &GitHubClient,
    user: &str,
    since: DateTime<Utc>,
) -> Result<Vec<RepositoryRef>, AppError> {
    let events = github.list_public_events(user).await?;
    Ok(events
        .iter()
        .filter(|event| event.created_at >= since)
        .filter_map(|event| RepositoryRef::parse(&event.repo.name))
        .collect())
}

async fn repos_from_commit_search(
    github: &GitHubClient,
    user: &str,
    since: DateTime<Utc>,
) -> Result<Vec<RepositoryRef>, AppError> {
    let results = github.search_commits(&commit_search_query(user, since)).await?;
    Ok(results
        .items
        .iter()
        .filter_map(|item| RepositoryRef::parse(&item.repository.full_name))
        .collect())
}

/// Commit search query for commits authored by `user` after `since`.
pub fn commit_search_query(user: &str, since: DateTime<Utc>) -> String {
    format!(
        "author:{} committer-date:>{}",
        user,
        format_search_timestamp(since)
    )
}
