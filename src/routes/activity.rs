// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity routes: actor classification, repository discovery, the commit
//! progress stream and the issue/PR listing.

use crate::error::{AppError, Result};
use crate::models::actor::is_valid_login;
use crate::models::{Actor, ActorKind, IssueOrPr, ProgressEvent, RepositoryRef};
use crate::stream::format_progress;
use crate::time_utils::{format_utc_rfc3339, Timeframe, Window};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/actors/{login}", get(get_actor))
        .route("/api/repositories", get(get_repositories))
        .route("/api/commits", get(stream_commits))
        .route("/api/issues", get(get_issues))
}

// ─── Request parsing ─────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    /// GitHub login of the actor
    pub actor: Option<String>,
    /// `day`, `week`, `month`, `year` or `custom`
    pub timeframe: Option<String>,
    /// Day count for the `custom` timeframe
    pub days: Option<String>,
    /// JSON array of `owner/name` strings; skips discovery when present
    pub repos: Option<String>,
}

impl ActivityQuery {
    /// Validated actor login and query window. Runs before any network call.
    fn resolve(&self) -> Result<(String, Window)> {
        let login = validate_login(self.actor.as_deref())?;
        let timeframe = Timeframe::parse(self.timeframe.as_deref(), self.days.as_deref())?;
        Ok((login, timeframe.window(chrono::Utc::now())))
    }

    /// Explicit repository list, if the client sent one.
    fn explicit_repos(&self) -> Result<Option<Vec<RepositoryRef>>> {
        let Some(raw) = self.repos.as_deref() else {
            return Ok(None);
        };

        let names: Vec<String> = serde_json::from_str(raw)
            .map_err(|_| AppError::BadRequest("'repos' must be a JSON array of strings".to_string()))?;

        let mut repos = names
            .iter()
            .map(|name| {
                RepositoryRef::parse(name)
                    .ok_or_else(|| AppError::BadRequest(format!("Invalid repository: {}", name)))
            })
            .collect::<Result<Vec<_>>>()?;
        repos.sort();
        repos.dedup();
        Ok(Some(repos))
    }
}

fn validate_login(login: Option<&str>) -> Result<String> {
    let login = login
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing 'actor'".to_string()))?;

    if !is_valid_login(login) {
        return Err(AppError::BadRequest(format!("Invalid GitHub login: {}", login)));
    }
    Ok(login.to_string())
}

// ─── Actor ───────────────────────────────────────────────────

/// Classify a login as user or organization.
async fn get_actor(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
) -> Result<Json<Actor>> {
    let login = validate_login(Some(&login))?;
    Ok(Json(state.aggregator.classify(&login).await))
}

// ─── Repositories ────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RepositoriesResponse {
    pub actor: String,
    pub kind: ActorKind,
    pub since: String,
    pub until: String,
    pub repositories: Vec<String>,
}

/// Repositories with activity in the window.
async fn get_repositories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivityQuery>,
) -> Result<Json<RepositoriesResponse>> {
    let (login, window) = params.resolve()?;
    let actor = state.aggregator.classify(&login).await;
    let repos = state.aggregator.discover(&actor, window.since).await?;

    Ok(Json(RepositoriesResponse {
        actor: actor.login,
        kind: actor.kind,
        since: format_utc_rfc3339(window.since),
        until: format_utc_rfc3339(window.until),
        repositories: repos.iter().map(|r| r.to_string()).collect(),
    }))
}

// ─── Commits (progress stream) ───────────────────────────────

/// Stream commit aggregation progress followed by the bucketed result.
///
/// Input errors and an empty repository set are reported as regular error
/// responses; the event stream only opens once there is work to do.
async fn stream_commits(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivityQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let (login, window) = params.resolve()?;
    let explicit = params.explicit_repos()?;

    let actor = state.aggregator.classify(&login).await;
    let repos = match explicit {
        Some(repos) if repos.is_empty() => return Err(AppError::NoRecentActivity),
        Some(repos) => repos,
        None => state.aggregator.discover(&actor, window.since).await?,
    };

    tracing::info!(
        login = %actor.login,
        kind = ?actor.kind,
        repos = repos.len(),
        since = %format_utc_rfc3339(window.since),
        "Opening commit progress stream"
    );

    let rx = state.aggregator.stream_commits(actor, repos, window.since);
    let events = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok(progress_event(event)), rx))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Encode one progress message as an SSE event.
pub fn progress_event(event: ProgressEvent) -> Event {
    match event {
        ProgressEvent::Progress { processed, total } => {
            Event::default().data(format_progress(processed, total))
        }
        ProgressEvent::Complete(buckets) => match Event::default().json_data(&buckets) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode commit payload");
                Event::default()
                    .event("error")
                    .data("Failed to encode commit payload")
            }
        },
        ProgressEvent::Failed(message) => Event::default().event("error").data(message),
    }
}

// ─── Issues and pull requests ────────────────────────────────

#[derive(Serialize)]
pub struct IssuesResponse {
    pub items: Vec<IssueOrPr>,
}

/// Issues and pull requests for the actor in the window.
async fn get_issues(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivityQuery>,
) -> Result<Json<IssuesResponse>> {
    let (login, window) = params.resolve()?;
    let actor = state.aggregator.classify(&login).await;
    let items = state.aggregator.fetch_issues(&actor, window.since).await?;
    Ok(Json(IssuesResponse { items }))
}
