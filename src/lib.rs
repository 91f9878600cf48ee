// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! gh-activity: What did a GitHub user or organization do?
//!
//! This crate provides the backend API that aggregates commits, issues and
//! pull requests across an actor's repositories, streams progress while it
//! fetches, and produces a summary and shareable snapshots of the result.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod stream;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{ActivityAggregator, SummaryService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub aggregator: ActivityAggregator,
    pub summarizer: SummaryService,
}
