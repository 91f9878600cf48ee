// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live progress of a commit aggregation run.

use crate::models::CommitBuckets;

/// Messages emitted by a commit aggregation run, in order.
///
/// Zero or more `Progress` events are followed by exactly one terminal
/// event (`Complete` or `Failed`), after which the stream closes.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Progress { processed: usize, total: usize },
    Complete(CommitBuckets),
    Failed(String),
}
