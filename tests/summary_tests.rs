// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary streaming tests against a mocked Anthropic API.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{body_json, body_text, create_test_app_with, UNREACHABLE_URL};

const API_KEY: &str = "test-anthropic-key";

fn delta(text: &str) -> String {
    format!(
        "event: content_block_delta\ndata: {}\n\n",
        json!({ "type": "content_block_delta", "index": 0,
                "delta": { "type": "text_delta", "text": text } })
    )
}

fn summary_request() -> serde_json::Value {
    json!({
        "commits": [{
            "oid": "a1",
            "messageHeadline": "Add widget",
            "committedDate": "2024-03-05T12:00:00Z",
            "additions": 10,
            "deletions": 2,
            "authorLogin": "alice",
            "repository": { "name": "widgets", "nameWithOwner": "acme/widgets" },
            "branch": "main",
            "isDefaultBranch": true
        }],
        "issuesAndPRs": [{
            "id": 9,
            "number": 4,
            "title": "Widget crash",
            "state": "closed",
            "createdAt": "2024-03-01T00:00:00Z",
            "updatedAt": "2024-03-04T00:00:00Z",
            "url": "https://github.com/acme/widgets/issues/4",
            "repository": { "nameWithOwner": "acme/widgets" },
            "type": "issue"
        }]
    })
}

async fn post_summary(app: axum::Router) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/summary")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(summary_request().to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_summary_streams_text_then_sentinel() {
    let server = MockServer::start().await;
    let sse = [
        "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n".to_string(),
        "event: content_block_start\ndata: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n".to_string(),
        delta("## Overview\n"),
        "event: ping\ndata: {\"type\":\"ping\"}\n\n".to_string(),
        delta("Shipped widgets."),
        "event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n".to_string(),
    ]
    .concat();

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header_eq("x-api-key", API_KEY))
        .and(header_eq("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "stream": true,
            "max_tokens": 4000,
            "model": "claude-3-opus-20240229"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (app, _) = create_test_app_with(UNREACHABLE_URL, &server.uri(), Some(API_KEY));
    let response = post_summary(app).await;
    assert_eq!(response.status(), StatusCode::OK);

    let text = body_text(response).await;
    assert_eq!(text, "## Overview\nShipped widgets.[DONE]");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = sent["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Message: Add widget\nChanges: +10 -2 lines\nDate: 2024-03-05"));
    assert!(prompt.contains("Type: ISSUE\nRepository: acme/widgets\nTitle: Widget crash"));
}

#[tokio::test]
async fn test_upstream_rejection_is_summary_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": { "type": "overloaded_error", "message": "Overloaded" }
        })))
        .mount(&server)
        .await;

    let (app, _) = create_test_app_with(UNREACHABLE_URL, &server.uri(), Some(API_KEY));
    let response = post_summary(app).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "summary_error");
    assert!(body["details"].as_str().unwrap().contains("Overloaded"));
}
