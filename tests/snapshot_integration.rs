// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Snapshot store integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST set); they skip otherwise.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use gh_activity::models::{snapshot_id, ActivitySnapshot, EnrichedCommit, RepositoryInfo};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app_from, test_config, test_db, UNREACHABLE_URL};

/// Generate a unique login for test isolation.
fn unique_login() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("user{}", nanos % 1_000_000_000_000)
}

fn commit(oid: &str, repo: &str, hours: i64) -> EnrichedCommit {
    EnrichedCommit {
        oid: oid.to_string(),
        message_headline: format!("commit {}", oid),
        committed_date: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap() + Duration::hours(hours),
        additions: 1,
        deletions: 0,
        url: String::new(),
        author_login: Some("someone".to_string()),
        author_name: None,
        repository: RepositoryInfo {
            name: repo.split('/').nth(1).unwrap_or_default().to_string(),
            name_with_owner: repo.to_string(),
        },
        branch: "main".to_string(),
        is_default_branch: true,
    }
}

fn snapshot(login: &str, summary: &str, commits: Vec<EnrichedCommit>) -> ActivitySnapshot {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = start + Duration::days(7);
    ActivitySnapshot {
        id: snapshot_id(login, start, end),
        actor: login.to_string(),
        start_time: start,
        end_time: end,
        summary: summary.to_string(),
        commits,
        issues: Vec::new(),
        pull_requests: Vec::new(),
        updated_at: Utc::now().to_rfc3339(),
    }
}

#[tokio::test]
async fn test_second_export_overwrites_same_key() {
    require_emulator!();

    let db = test_db().await;
    let login = unique_login();

    let first = snapshot(&login, "first summary", vec![commit("a", "acme/w", 1)]);
    db.upsert_snapshot(&first).await.unwrap();

    let second = snapshot(
        &login,
        "second summary",
        vec![commit("a", "acme/w", 1), commit("b", "acme/w", 2)],
    );
    assert_eq!(first.id, second.id);
    db.upsert_snapshot(&second).await.unwrap();

    let stored = db.get_snapshot(&first.id).await.unwrap().unwrap();
    assert_eq!(stored.summary, "second summary");
    assert_eq!(stored.commits.len(), 2);

    let listed = db.list_snapshots(Some(&login), 10).await.unwrap();
    assert_eq!(listed.len(), 1, "Same key must not create a second record");
}

#[tokio::test]
async fn test_missing_snapshot_is_none() {
    require_emulator!();

    let db = test_db().await;
    let missing = db.get_snapshot(&format!("{}-missing", unique_login())).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_export_and_share_over_http() {
    require_emulator!();

    let login = unique_login();
    let (app, _) = create_test_app_from(
        test_config(UNREACHABLE_URL, UNREACHABLE_URL, None),
        test_db().await,
    );
    let id = format!("{}-2024-01-01-to-2024-01-08", login);

    let commits: Vec<EnrichedCommit> = (0..25)
        .map(|i| commit(&format!("c{}", i), "acme/w", i))
        .collect();
    let body = json!({
        "id": id,
        "actor": login,
        "startTime": "2024-01-01T00:00:00Z",
        "endTime": "2024-01-08T00:00:00Z",
        "summary": "## Overview",
        "commits": commits,
        "issues": [],
        "pullRequests": [],
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/snapshots")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let exported = body_json(response).await;
    assert_eq!(
        exported["shareUrl"],
        format!("https://gh-activity.test/share/{}", id)
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/snapshots/{}/timeline?page=2", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let timeline = body_json(response).await;
    assert_eq!(timeline["items"].as_array().unwrap().len(), 5);
    assert_eq!(timeline["totalPages"], 2);
    assert_eq!(timeline["stats"]["totalCommits"], 25);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/snapshots/{}/meta", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let meta = body_json(response).await;
    assert_eq!(meta["description"], format!("What did {} get done this week?", login));
    assert_eq!(meta["repositories"], 1);
}
