// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Issue/PR fetch tests against a mocked search API.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use gh_activity::error::AppError;
use gh_activity::models::{Actor, IssueKind};
use gh_activity::services::issues::fetch_issues_and_prs;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{body_json, create_test_app_with, test_github, UNREACHABLE_URL};

fn search_item(id: u64, repo: &str, pr: bool) -> serde_json::Value {
    let mut item = json!({
        "id": id,
        "number": id % 1000,
        "title": format!("item {}", id),
        "state": "open",
        "created_at": "2024-02-02T00:00:00Z",
        "updated_at": "2024-02-03T00:00:00Z",
        "html_url": format!("https://github.com/{}/issues/{}", repo, id % 1000),
        "repository_url": format!("https://api.github.com/repos/{}", repo),
    });
    if pr {
        item["pull_request"] = json!({ "url": "https://api.github.com/pulls/1" });
    }
    item
}

#[tokio::test]
async fn test_user_query_and_classification() {
    let server = MockServer::start().await;
    let since = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", "involves:alice updated:>=2024-02-01T00:00:00+00:00"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "items": [
                search_item(1, "acme/widgets", true),
                search_item(2, "alice/blog", false),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let github = test_github(&server.uri());
    let items = fetch_issues_and_prs(&github, &Actor::user("alice"), since)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].kind, IssueKind::Pr);
    assert_eq!(items[0].repository.name_with_owner, "acme/widgets");
    assert_eq!(items[1].kind, IssueKind::Issue);
    assert_eq!(items[1].repository.name, "blog");
}

#[tokio::test]
async fn test_org_results_paginate_and_deduplicate() {
    let server = MockServer::start().await;
    let since = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

    let first_page: Vec<serde_json::Value> =
        (0..100).map(|i| search_item(1000 + i, "acme/api", i % 2 == 0)).collect();
    // The second page repeats one item from the first.
    let second_page = vec![search_item(1099, "acme/api", false), search_item(5000, "acme/web", false)];

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", "org:acme updated:>=2024-02-01T00:00:00+00:00"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 102,
            "items": first_page,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 102,
            "items": second_page,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_count": 102, "items": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let github = test_github(&server.uri());
    let items = fetch_issues_and_prs(&github, &Actor::organization("acme"), since)
        .await
        .unwrap();

    assert_eq!(items.len(), 101);
    let mut ids: Vec<u64> = items.iter().map(|i| i.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 101);
    assert_eq!(items.iter().filter(|i| i.is_pr()).count(), 50);
}

#[tokio::test]
async fn test_rate_limit_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let github = test_github(&server.uri());
    let err = fetch_issues_and_prs(
        &github,
        &Actor::user("alice"),
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
    )
    .await
    .unwrap_err();
    assert!(err.is_rate_limited());
    assert!(matches!(err, AppError::GitHubApi(_)));
}

#[tokio::test]
async fn test_issues_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "items": [search_item(7, "alice/blog", false)]
        })))
        .mount(&server)
        .await;

    let (app, _) = create_test_app_with(&server.uri(), UNREACHABLE_URL, None);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/issues?actor=alice&timeframe=month")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["items"][0]["type"], "issue");
    assert_eq!(body["items"][0]["repository"]["nameWithOwner"], "alice/blog");
    assert_eq!(body["items"][0]["updatedAt"], "2024-02-03T00:00:00Z");
}
