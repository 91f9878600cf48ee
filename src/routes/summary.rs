// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary route: streams generated markdown followed by `[DONE]`.

use crate::error::{AppError, Result};
use crate::models::{EnrichedCommit, IssueOrPr};
use crate::services::summary::DONE_SENTINEL;
use crate::AppState;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures_util::stream;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/summary", post(generate_summary))
}

/// Summary request body. Both lists must be present, even if empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub commits: Option<Vec<EnrichedCommit>>,
    #[serde(alias = "issuesAndPRs")]
    pub issues_and_prs: Option<Vec<IssueOrPr>>,
}

/// Generate a summary of the posted activity.
///
/// The response body is the raw text stream. If generation fails midway the
/// body ends without the sentinel.
async fn generate_summary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummaryRequest>,
) -> Result<Response> {
    let (Some(commits), Some(issues_and_prs)) = (request.commits, request.issues_and_prs) else {
        return Err(AppError::BadRequest(
            "Request must include 'commits' and 'issuesAndPrs' arrays".to_string(),
        ));
    };

    let rx = state
        .summarizer
        .stream_summary(&commits, &issues_and_prs)
        .await?;

    let body = stream::unfold(Some(rx), |rx| async move {
        let mut rx = rx?;
        match rx.recv().await {
            Some(Ok(text)) => Some((Ok(text), Some(rx))),
            Some(Err(e)) => {
                tracing::error!(error = %e, "Summary stream failed");
                Some((Err(e), None))
            }
            None => Some((Ok(DONE_SENTINEL.to_string()), None)),
        }
    });

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(body),
    )
        .into_response())
}
