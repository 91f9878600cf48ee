// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregator;
pub mod classifier;
pub mod commits;
pub mod discovery;
pub mod github;
pub mod issues;
pub mod scheduler;
pub mod summary;
pub mod timeline;

pub use aggregator::ActivityAggregator;
pub use github::GitHubClient;
pub use scheduler::BatchSchedule;
pub use summary::SummaryService;
pub use timeline::{ActivityView, ItemType, TimelineQuery, TypeFilter};
