// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("No repositories with recent activity")]
    NoRecentActivity,

    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("Summary generation error: {0}")]
    Summary(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message carried by `GitHubApi` when the upstream rate limit is exhausted.
    pub const GITHUB_RATE_LIMIT: &'static str = "GitHub rate limit exceeded";

    /// Whether this error came from GitHub reporting an exhausted rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::GitHubApi(msg) if msg == Self::GITHUB_RATE_LIMIT)
    }

    /// Whether the caller is at fault (as opposed to an upstream or server failure).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::BadRequest(_) | AppError::NotFound(_) | AppError::NoRecentActivity
        )
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::NoRecentActivity => (
                StatusCode::NOT_FOUND,
                "no_recent_activity",
                Some(self.to_string()),
            ),
            AppError::GitHubApi(msg) => {
                (StatusCode::BAD_GATEWAY, "github_error", Some(msg.clone()))
            }
            AppError::Summary(msg) => {
                tracing::error!(error = %msg, "Summary generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "summary_error",
                    Some(msg.clone()),
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
