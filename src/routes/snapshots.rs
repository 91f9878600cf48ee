// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Snapshot routes: export, read back, timeline view and share metadata.

use crate::db::firestore::RECENT_SNAPSHOT_LIMIT;
use crate::error::{AppError, Result};
use crate::models::{ActivitySnapshot, EnrichedCommit, IssueOrPr};
use crate::services::timeline::{ActivityStats, ItemType, TimelineItem, TimelineQuery, TypeFilter};
use crate::services::ActivityView;
use crate::time_utils::{format_utc_date, format_utc_rfc3339, timeframe_phrase};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/snapshots", get(list_snapshots).post(export_snapshot))
        .route("/api/snapshots/{id}", get(get_snapshot))
        .route("/api/snapshots/{id}/timeline", get(get_timeline))
        .route("/api/snapshots/{id}/meta", get(get_meta))
}

// ─── Export ──────────────────────────────────────────────────

/// Firestore document IDs cannot contain `/` or be `.` / `..`.
fn validate_document_id(id: &str) -> std::result::Result<(), ValidationError> {
    if id.contains('/') || id == "." || id == ".." {
        return Err(ValidationError::new("document_id"));
    }
    Ok(())
}

/// Export request: the merged activity plus its summary.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[validate(required, length(min = 1, max = 200), custom(function = "validate_document_id"))]
    pub id: Option<String>,
    #[serde(alias = "username")]
    #[validate(required, length(min = 1, max = 39))]
    pub actor: Option<String>,
    #[validate(required)]
    pub start_time: Option<DateTime<Utc>>,
    #[validate(required)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub commits: Vec<EnrichedCommit>,
    #[serde(default)]
    pub issues: Vec<IssueOrPr>,
    #[serde(default)]
    pub pull_requests: Vec<IssueOrPr>,
}

impl ExportRequest {
    fn into_snapshot(self) -> Result<ActivitySnapshot> {
        self.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let (Some(id), Some(actor), Some(start_time), Some(end_time)) =
            (self.id, self.actor, self.start_time, self.end_time)
        else {
            return Err(AppError::BadRequest(
                "Request must include id, actor, startTime and endTime".to_string(),
            ));
        };

        if end_time < start_time {
            return Err(AppError::BadRequest(
                "endTime must not be before startTime".to_string(),
            ));
        }

        Ok(ActivitySnapshot {
            id,
            actor,
            start_time,
            end_time,
            summary: self.summary,
            commits: self.commits,
            issues: self.issues,
            pull_requests: self.pull_requests,
            updated_at: format_utc_rfc3339(Utc::now()),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExportResponse {
    pub id: String,
    pub share_url: String,
}

/// Create or overwrite the snapshot for an actor and window.
async fn export_snapshot(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportResponse>> {
    let snapshot = request.into_snapshot()?;
    state.db.upsert_snapshot(&snapshot).await?;

    Ok(Json(ExportResponse {
        share_url: share_url(&state.config.app_url, &snapshot.id),
        id: snapshot.id,
    }))
}

fn share_url(app_url: &str, id: &str) -> String {
    format!("{}/share/{}", app_url, urlencoding::encode(id))
}

// ─── Read ────────────────────────────────────────────────────

async fn load_snapshot(state: &AppState, id: &str) -> Result<ActivitySnapshot> {
    state
        .db
        .get_snapshot(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Snapshot {}", id)))
}

/// Get one snapshot by key.
async fn get_snapshot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActivitySnapshot>> {
    Ok(Json(load_snapshot(&state, &id).await?))
}

#[derive(Deserialize)]
struct ListQuery {
    actor: Option<String>,
}

/// Listing entry without the activity payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotListEntry {
    pub id: String,
    pub actor: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub commits: usize,
    pub issues: usize,
    pub pull_requests: usize,
}

/// The most recent snapshots, optionally for one actor.
async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<SnapshotListEntry>>> {
    let actor = params.actor.as_deref().map(str::trim).filter(|a| !a.is_empty());
    let snapshots = state.db.list_snapshots(actor, RECENT_SNAPSHOT_LIMIT).await?;

    Ok(Json(
        snapshots
            .into_iter()
            .map(|s| SnapshotListEntry {
                commits: s.commits.len(),
                issues: s.issues.len(),
                pull_requests: s.pull_requests.len(),
                id: s.id,
                actor: s.actor,
                start_time: s.start_time,
                end_time: s.end_time,
            })
            .collect(),
    ))
}

// ─── Timeline ────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TimelineParams {
    /// Comma-separated item types (`commit,issue,pr`); empty means all
    pub types: Option<String>,
    /// Repository filter (`owner/name` or `all`)
    pub repo: Option<String>,
    /// 1-based page index
    pub page: Option<usize>,
    /// Item type to flip before paging; resets to page 1
    pub toggle: Option<String>,
}

impl TimelineParams {
    pub fn to_query(&self) -> Result<TimelineQuery> {
        let mut types = Vec::new();
        for raw in self.types.iter().flat_map(|t| t.split(',')) {
            if raw.trim().is_empty() {
                continue;
            }
            types.push(
                ItemType::parse(raw)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown item type: {}", raw)))?,
            );
        }

        let mut query = TimelineQuery {
            types: TypeFilter::from_types(types),
            ..Default::default()
        };
        query.set_repository(self.repo.as_deref());
        query.set_page(self.page.unwrap_or(1));

        if let Some(raw) = self.toggle.as_deref() {
            let item_type = ItemType::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown item type: {}", raw)))?;
            query.toggle(item_type);
        }
        Ok(query)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResponse {
    pub items: Vec<TimelineItem>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// Active item types after any toggle
    pub types: Vec<ItemType>,
    pub repository: Option<String>,
    /// Repository filter options, `all` first
    pub repositories: Vec<String>,
    pub stats: ActivityStats,
}

/// Filtered, paginated timeline of a snapshot.
async fn get_timeline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<TimelineParams>,
) -> Result<Json<TimelineResponse>> {
    let query = params.to_query()?;
    let view = snapshot_view(load_snapshot(&state, &id).await?);
    let page = view.page(&query);

    Ok(Json(TimelineResponse {
        items: page.items,
        page: page.page,
        per_page: page.per_page,
        total_items: page.total_items,
        total_pages: page.total_pages,
        types: query.types.types().collect(),
        repository: query.repository,
        repositories: view.repository_options(),
        stats: view.stats().clone(),
    }))
}

fn snapshot_view(snapshot: ActivitySnapshot) -> ActivityView {
    let mut items = snapshot.issues;
    items.extend(snapshot.pull_requests);
    ActivityView::new(snapshot.commits, items)
}

// ─── Share metadata ──────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ShareMetadata {
    pub title: String,
    pub description: String,
    pub timeframe: String,
    pub start_date: String,
    pub end_date: String,
    pub commits: usize,
    pub issues: usize,
    pub pull_requests: usize,
    pub repositories: usize,
    pub share_url: String,
}

/// Build share metadata for a stored snapshot.
pub fn share_metadata(snapshot: &ActivitySnapshot, app_url: &str) -> ShareMetadata {
    let timeframe = timeframe_phrase(snapshot.start_time, snapshot.end_time);
    let repositories = snapshot
        .commits
        .iter()
        .map(|c| c.repository.name_with_owner.as_str())
        .chain(
            snapshot
                .issues
                .iter()
                .chain(&snapshot.pull_requests)
                .map(|i| i.repository.name_with_owner.as_str()),
        )
        .collect::<std::collections::HashSet<_>>()
        .len();

    ShareMetadata {
        title: format!("What did {} do?", snapshot.actor),
        description: format!("What did {} get done {}?", snapshot.actor, timeframe),
        timeframe,
        start_date: format_utc_date(snapshot.start_time),
        end_date: format_utc_date(snapshot.end_time),
        commits: snapshot.commits.len(),
        issues: snapshot.issues.len(),
        pull_requests: snapshot.pull_requests.len(),
        repositories,
        share_url: share_url(app_url, &snapshot.id),
    }
}

async fn get_meta(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ShareMetadata>> {
    let snapshot = load_snapshot(&state, &id).await?;
    Ok(Json(share_metadata(&snapshot, &state.config.app_url)))
}
