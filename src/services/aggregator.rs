// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity aggregation pipeline.
//!
//! Actor classification -> repository discovery -> batched commit fetch,
//! with the issue/PR fetch as an independent path. Results are merged only
//! at presentation time (see `services::timeline`).

use crate::error::{AppError, Result};
use crate::models::{Actor, IssueOrPr, ProgressEvent, RepositoryRef};
use crate::services::scheduler::{run_batches, BatchSchedule};
use crate::services::{classifier, commits, discovery, issues, GitHubClient};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// Buffered progress events between the producer task and the consumer.
const PROGRESS_CHANNEL_CAPACITY: usize = 16;

/// Runs aggregation against GitHub with a fixed batch schedule.
#[derive(Clone)]
pub struct ActivityAggregator {
    github: GitHubClient,
    schedule: BatchSchedule,
}

impl ActivityAggregator {
    pub fn new(github: GitHubClient, schedule: BatchSchedule) -> Self {
        Self { github, schedule }
    }

    /// Classify a login as organization or user.
    pub async fn classify(&self, login: &str) -> Actor {
        classifier::classify_actor(&self.github, login).await
    }

    /// Discover repositories for the actor.
    ///
    /// An empty result ends the run with [`AppError::NoRecentActivity`].
    pub async fn discover(&self, actor: &Actor, since: DateTime<Utc>) -> Result<Vec<RepositoryRef>> {
        let repos = discovery::discover_repositories(&self.github, actor, since).await;
        if repos.is_empty() {
            tracing::info!(login = %actor.login, "No repositories with recent activity");
            return Err(AppError::NoRecentActivity);
        }
        Ok(repos.into_iter().collect())
    }

    /// Start the batched commit fetch in the background and return its progress stream.
    ///
    /// The receiver yields progress events followed by one terminal event.
    /// The channel closes when the producer finishes, fails or panics, so a
    /// consumer loop always terminates. If the receiver is dropped, the
    /// producer stops after its current batch.
    pub fn stream_commits(
        &self,
        actor: Actor,
        repos: Vec<RepositoryRef>,
        since: DateTime<Utc>,
    ) -> mpsc::Receiver<ProgressEvent> {
        let (tx, rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        let github = self.github.clone();
        let schedule = self.schedule;

        tokio::spawn(async move {
            let total = repos.len();
            tracing::info!(
                login = %actor.login,
                repos = total,
                batch_size = schedule.batch_size,
                "Starting commit aggregation"
            );

            let github = &github;
            let actor_ref = &actor;
            let outcome = run_batches(
                &repos,
                schedule,
                move |repo: RepositoryRef| async move {
                    commits::fetch_repo_commits(github, &repo, actor_ref, since).await
                },
                &tx,
            )
            .await;

            let Some(buckets) = outcome else {
                return;
            };

            let terminal = if total > 0 && buckets.failed_repositories.len() == total {
                tracing::error!(login = %actor.login, repos = total, "Every repository fetch failed");
                ProgressEvent::Failed("Failed to fetch commits for every repository".to_string())
            } else {
                tracing::info!(
                    login = %actor.login,
                    default_branch = buckets.default_branch.len(),
                    other_branches = buckets.other_branches.len(),
                    failed = buckets.failed_repositories.len(),
                    "Commit aggregation complete"
                );
                ProgressEvent::Complete(buckets)
            };

            if tx.send(terminal).await.is_err() {
                tracing::debug!("Progress consumer went away before the final payload");
            }
        });

        rx
    }

    /// Fetch the actor's issues and pull requests.
    pub async fn fetch_issues(&self, actor: &Actor, since: DateTime<Utc>) -> Result<Vec<IssueOrPr>> {
        issues::fetch_issues_and_prs(&self.github, actor, since).await
    }
}
