// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Exported activity snapshots (keyed by `actor-start-to-end`)
    pub const SNAPSHOTS: &str = "activity_snapshots";
}
