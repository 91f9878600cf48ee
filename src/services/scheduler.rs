// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Batch scheduler for per-repository commit fetches.
//!
//! Repositories are fetched in fixed-size batches. Fetches within a batch
//! run concurrently on the current task; the next batch starts only after
//! the whole batch resolved and the inter-batch delay elapsed. The delay is
//! a static backoff and does not look at rate-limit headers.

use crate::error::AppError;
use crate::models::{CommitBuckets, ProgressEvent, RepositoryRef};
use futures_util::future::join_all;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

/// Batch size and pause used when walking repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSchedule {
    pub batch_size: usize,
    pub delay: Duration,
}

impl BatchSchedule {
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            delay,
        }
    }
}

/// Run `fetch` over every repository in batches, reporting progress after each batch.
///
/// A failing repository does not fail its batch: it is logged, counted as
/// processed and listed in `failed_repositories`. Returns `None` when the
/// progress receiver went away, in which case remaining batches are skipped.
/// Both result buckets are sorted newest first.
pub async fn run_batches<F, Fut>(
    repos: &[RepositoryRef],
    schedule: BatchSchedule,
    fetch: F,
    progress: &mpsc::Sender<ProgressEvent>,
) -> Option<CommitBuckets>
where
    F: Fn(RepositoryRef) -> Fut,
    Fut: Future<Output = Result<CommitBuckets, AppError>>,
{
    let total = repos.len();
    let mut buckets = CommitBuckets::default();
    let mut processed = 0;

    for batch in repos.chunks(schedule.batch_size.max(1)) {
        let results = join_all(batch.iter().cloned().map(&fetch)).await;

        for (repo, result) in batch.iter().zip(results) {
            match result {
                Ok(repo_buckets) => buckets.extend(repo_buckets),
                Err(e) => {
                    tracing::warn!(repo = %repo, error = %e, "Repository commit fetch failed");
                    buckets.failed_repositories.push(repo.to_string());
                }
            }
        }

        processed += batch.len();
        tracing::debug!(processed, total, "Commit batch complete");

        if progress
            .send(ProgressEvent::Progress { processed, total })
            .await
            .is_err()
        {
            tracing::info!(processed, total, "Progress consumer went away, stopping");
            return None;
        }

        if processed < total && !schedule.delay.is_zero() {
            tokio::time::sleep(schedule.delay).await;
        }
    }

    buckets.sort_newest_first();
    Some(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnrichedCommit, RepositoryInfo};
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn repos(n: usize) -> Vec<RepositoryRef> {
        (0..n)
            .map(|i| RepositoryRef::parse(&format!("acme/repo-{}", i)).unwrap())
            .collect()
    }

    fn commit(repo: &RepositoryRef, day: u32) -> EnrichedCommit {
        EnrichedCommit {
            oid: format!("{}-{}", repo, day),
            message_headline: "change".to_string(),
            committed_date: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            additions: 1,
            deletions: 0,
            url: String::new(),
            author_login: Some("alice".to_string()),
            author_name: None,
            repository: RepositoryInfo::from(repo),
            branch: "main".to_string(),
            is_default_branch: true,
        }
    }

    fn drain(rx: &mut mpsc::Receiver<ProgressEvent>) -> Vec<(usize, usize)> {
        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let ProgressEvent::Progress { processed, total } = event {
                seen.push((processed, total));
            }
        }
        seen
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_bounded() {
        let repos = repos(7);
        let (tx, mut rx) = mpsc::channel(16);
        let schedule = BatchSchedule::new(3, Duration::ZERO);

        let buckets = run_batches(
            &repos,
            schedule,
            |repo| async move {
                let mut b = CommitBuckets::default();
                b.push(commit(&repo, 1));
                Ok::<_, AppError>(b)
            },
            &tx,
        )
        .await
        .unwrap();

        assert_eq!(drain(&mut rx), vec![(3, 7), (6, 7), (7, 7)]);
        assert_eq!(buckets.default_branch.len(), 7);
    }

    #[tokio::test]
    async fn test_failed_repository_is_isolated() {
        let repos = repos(3);
        let (tx, mut rx) = mpsc::channel(16);

        let buckets = run_batches(
            &repos,
            BatchSchedule::new(3, Duration::ZERO),
            |repo| async move {
                if repo.name() == "repo-1" {
                    Err(AppError::GitHubApi("HTTP 502".to_string()))
                } else {
                    let mut b = CommitBuckets::default();
                    b.push(commit(&repo, 2));
                    Ok(b)
                }
            },
            &tx,
        )
        .await
        .unwrap();

        assert_eq!(buckets.default_branch.len(), 2);
        assert_eq!(buckets.failed_repositories, vec!["acme/repo-1".to_string()]);
        assert_eq!(drain(&mut rx), vec![(3, 3)]);
    }

    #[tokio::test]
    async fn test_results_sorted_newest_first() {
        let repos = repos(4);
        let (tx, _rx) = mpsc::channel(16);
        let day = AtomicUsize::new(1);

        let buckets = run_batches(
            &repos,
            BatchSchedule::new(2, Duration::ZERO),
            |repo| {
                let d = day.fetch_add(1, Ordering::SeqCst) as u32;
                async move {
                    let mut b = CommitBuckets::default();
                    b.push(commit(&repo, d));
                    Ok::<_, AppError>(b)
                }
            },
            &tx,
        )
        .await
        .unwrap();

        let dates: Vec<_> = buckets.default_branch.iter().map(|c| c.committed_date).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
    }

    #[tokio::test]
    async fn test_stops_when_consumer_drops() {
        let repos = repos(6);
        let (tx, rx) = mpsc::channel(16);
        drop(rx);
        let calls = AtomicUsize::new(0);

        let outcome = run_batches(
            &repos,
            BatchSchedule::new(2, Duration::ZERO),
            |_repo| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, AppError>(CommitBuckets::default()) }
            },
            &tx,
        )
        .await;

        assert!(outcome.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
