// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod actor;
pub mod commit;
pub mod issue;
pub mod progress;
pub mod repository;
pub mod snapshot;

pub use actor::{Actor, ActorKind};
pub use commit::{CommitBuckets, EnrichedCommit};
pub use issue::{IssueKind, IssueOrPr};
pub use progress::ProgressEvent;
pub use repository::{RepositoryInfo, RepositoryRef};
pub use snapshot::{snapshot_id, ActivitySnapshot};
