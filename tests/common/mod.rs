// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use gh_activity::config::Config;
use gh_activity::db::FirestoreDb;
use gh_activity::routes::create_router;
use gh_activity::services::{ActivityAggregator, BatchSchedule, GitHubClient, SummaryService};
use gh_activity::AppState;
use std::sync::Arc;

/// An address nothing listens on; requests to it fail fast.
#[allow(dead_code)]
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Config pointing at the given upstreams, with no inter-batch delay.
#[allow(dead_code)]
pub fn test_config(github_url: &str, anthropic_url: &str, anthropic_key: Option<&str>) -> Config {
    Config {
        github_api_url: github_url.to_string(),
        anthropic_api_url: anthropic_url.to_string(),
        anthropic_api_key: anthropic_key.map(str::to_string),
        app_url: "https://gh-activity.test".to_string(),
        ..Config::default()
    }
}

/// GitHub client for the given API base URL.
#[allow(dead_code)]
pub fn test_github(github_url: &str) -> GitHubClient {
    GitHubClient::new(github_url, "test_github_token").expect("client should build")
}

/// Create a test app from a config and database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_from(config: Config, db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let github = test_github(&config.github_api_url);
    let schedule = BatchSchedule::new(config.commit_batch_size, config.commit_batch_delay);
    let aggregator = ActivityAggregator::new(github, schedule);
    let summarizer = SummaryService::new(&config).expect("summary client should build");

    let state = Arc::new(AppState {
        config,
        db,
        aggregator,
        summarizer,
    });

    (create_router(state.clone()), state)
}

/// Create a test app against the given upstreams with an offline database.
#[allow(dead_code)]
pub fn create_test_app_with(
    github_url: &str,
    anthropic_url: &str,
    anthropic_key: Option<&str>,
) -> (axum::Router, Arc<AppState>) {
    create_test_app_from(
        test_config(github_url, anthropic_url, anthropic_key),
        test_db_offline(),
    )
}

/// Create a test app whose upstreams are all unreachable.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(UNREACHABLE_URL, UNREACHABLE_URL, None)
}

/// Read a response body as a string.
#[allow(dead_code)]
pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).expect("body should be JSON")
}
