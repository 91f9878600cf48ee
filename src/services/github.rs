// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub API client (REST + GraphQL).
//!
//! Handles:
//! - Organization lookup
//! - Repository listings and the public event feed
//! - Commit and issue search
//! - Branch commit histories via GraphQL
//! - Rate limit detection

use crate::error::AppError;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{de::DeserializeOwned, Deserialize};

const USER_AGENT: &str = concat!("gh-activity/", env!("CARGO_PKG_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Page size used for every paginated REST listing.
pub const PER_PAGE: u32 = 100;

/// GitHub API client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Look up an organization. Fails (typically 404) when the login is not
    /// an organization.
    pub async fn get_organization(&self, login: &str) -> Result<Organization, AppError> {
        let url = format!("{}/orgs/{}", self.base_url, urlencoding::encode(login));
        self.get_json(&url, &[]).await
    }

    /// One page of an organization's repositories, most recently pushed first.
    pub async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
    ) -> Result<Vec<RepoSummary>, AppError> {
        let url = format!("{}/orgs/{}/repos", self.base_url, urlencoding::encode(org));
        self.get_json(
            &url,
            &[
                ("sort", "pushed".to_string()),
                ("direction", "desc".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    /// One page of the repositories a user owns, most recently pushed first.
    pub async fn list_user_repos(
        &self,
        user: &str,
        page: u32,
    ) -> Result<Vec<RepoSummary>, AppError> {
        let url = format!("{}/users/{}/repos", self.base_url, urlencoding::encode(user));
        self.get_json(
            &url,
            &[
                ("type", "owner".to_string()),
                ("sort", "pushed".to_string()),
                ("direction", "desc".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    /// Recent public events for a user (GitHub keeps roughly 90 days / 300 events).
    pub async fn list_public_events(&self, user: &str) -> Result<Vec<PublicEvent>, AppError> {
        let url = format!(
            "{}/users/{}/events/public",
            self.base_url,
            urlencoding::encode(user)
        );
        self.get_json(&url, &[("per_page", PER_PAGE.to_string())])
            .await
    }

    /// Search commits. `query` uses GitHub search syntax.
    pub async fn search_commits(&self, query: &str) -> Result<CommitSearchResponse, AppError> {
        let url = format!("{}/search/commits", self.base_url);
        self.get_json(
            &url,
            &[
                ("q", query.to_string()),
                ("sort", "committer-date".to_string()),
                ("order", "desc".to_string()),
                ("per_page", PER_PAGE.to_string()),
            ],
        )
        .await
    }

    /// One page of issue/PR search results.
    pub async fn search_issues(
        &self,
        query: &str,
        page: u32,
    ) -> Result<IssueSearchResponse, AppError> {
        let url = format!("{}/search/issues", self.base_url);
        self.get_json(
            &url,
            &[
                ("q", query.to_string()),
                ("sort", "updated".to_string()),
                ("order", "desc".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    /// Run a GraphQL query and return its `data` member.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, AppError> {
        let url = format!("{}/graphql", self.base_url);
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GitHubApi(e.to_string()))?;

        let envelope: GraphQlResponse<T> = self.check_response_json(response).await?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            if errors
                .iter()
                .any(|e| e.error_type.as_deref() == Some("RATE_LIMITED"))
            {
                tracing::warn!("GitHub GraphQL rate limit hit");
                return Err(AppError::GitHubApi(AppError::GITHUB_RATE_LIMIT.to_string()));
            }
            return Err(AppError::GitHubApi(format!(
                "GraphQL errors: {}",
                messages.join("; ")
            )));
        }

        envelope
            .data
            .ok_or_else(|| AppError::GitHubApi("GraphQL response missing data".to_string()))
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::GitHubApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let rate_limited = status.as_u16() == 429
                || (status.as_u16() == 403
                    && response
                        .headers()
                        .get("x-ratelimit-remaining")
                        .is_some_and(|v| v.as_bytes() == b"0"));
            let body = response.text().await.unwrap_or_default();

            if rate_limited {
                tracing::warn!(status = %status, "GitHub rate limit hit");
                return Err(AppError::GitHubApi(AppError::GITHUB_RATE_LIMIT.to_string()));
            }

            return Err(AppError::GitHubApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GitHubApi(format!("JSON parse error: {}", e)))
    }
}

// ─── REST payloads ───────────────────────────────────────────────────────────

/// Organization lookup response (only the fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub login: String,
}

/// Repository entry from the repo listing endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Entry of the public event feed.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicEvent {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub repo: EventRepo,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRepo {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitSearchResponse {
    #[serde(default)]
    pub items: Vec<CommitSearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitSearchItem {
    pub repository: SearchRepository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRepository {
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueSearchResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<IssueSearchItem>,
}

/// Issue search result. Pull requests carry a `pull_request` member.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueSearchItem {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub html_url: String,
    pub pull_request: Option<serde_json::Value>,
    pub repository_url: Option<String>,
    pub repository: Option<SearchRepository>,
}

// ─── GraphQL payloads ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryHistoryData {
    pub repository: Option<RepositoryHistory>,
}

/// A repository with the commit history of each branch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryHistory {
    pub name: String,
    pub name_with_owner: String,
    pub default_branch_ref: Option<BranchName>,
    pub refs: BranchConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchName {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchConnection {
    #[serde(default)]
    pub nodes: Vec<Branch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    pub name: String,
    pub target: Option<BranchTarget>,
}

/// Target of a ref; only commits carry a history.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchTarget {
    pub history: Option<CommitHistory>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitHistory {
    #[serde(default)]
    pub nodes: Vec<CommitNode>,
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNode {
    pub oid: String,
    pub message_headline: String,
    pub committed_date: DateTime<Utc>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub url: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub name: Option<String>,
    pub user: Option<AuthorUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorUser {
    pub login: String,
}

impl CommitNode {
    pub fn author_login(&self) -> Option<&str> {
        self.author
            .as_ref()
            .and_then(|a| a.user.as_ref())
            .map(|u| u.login.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchHistoryData {
    pub repository: Option<BranchHistoryRepository>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchHistoryRepository {
    #[serde(rename = "ref")]
    pub branch_ref: Option<Branch>,
}
