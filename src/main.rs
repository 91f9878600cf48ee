// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! gh-activity API Server
//!
//! Aggregates a GitHub actor's commits, issues and pull requests over a
//! time window and streams progress to the client.

use gh_activity::{
    config::Config,
    db::FirestoreDb,
    services::{ActivityAggregator, BatchSchedule, GitHubClient, SummaryService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting gh-activity API");

    // Initialize Firestore database (snapshot store)
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    // GitHub client and aggregation pipeline
    let github = GitHubClient::new(&config.github_api_url, &config.github_token)?;
    let schedule = BatchSchedule::new(config.commit_batch_size, config.commit_batch_delay);
    tracing::info!(
        api = %config.github_api_url,
        batch_size = schedule.batch_size,
        batch_delay_ms = schedule.delay.as_millis() as u64,
        "GitHub client initialized"
    );
    let aggregator = ActivityAggregator::new(github, schedule);

    let summarizer = SummaryService::new(&config)?;
    if !summarizer.is_configured() {
        tracing::warn!("ANTHROPIC_API_KEY not set, summaries are disabled");
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        aggregator,
        summarizer,
    });

    // Build router
    let app = gh_activity::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gh_activity=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
