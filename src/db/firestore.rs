// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper for the snapshot store.
//!
//! Snapshots are written once per export and read back by key for share
//! views. Exporting the same actor and window again overwrites the document.

use crate::db::collections;
use crate::error::AppError;
use crate::models::ActivitySnapshot;

/// Number of snapshots returned by [`FirestoreDb::list_snapshots`].
pub const RECENT_SNAPSHOT_LIMIT: u32 = 10;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Snapshot Operations ─────────────────────────────────────

    /// Get a snapshot by its composite key.
    pub async fn get_snapshot(&self, id: &str) -> Result<Option<ActivitySnapshot>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SNAPSHOTS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a snapshot at its key.
    pub async fn upsert_snapshot(&self, snapshot: &ActivitySnapshot) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SNAPSHOTS)
            .document_id(&snapshot.id)
            .object(snapshot)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            id = %snapshot.id,
            actor = %snapshot.actor,
            commits = snapshot.commits.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    /// Most recent snapshots by window start, optionally for one actor.
    pub async fn list_snapshots(
        &self,
        actor: Option<&str>,
        limit: u32,
    ) -> Result<Vec<ActivitySnapshot>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SNAPSHOTS);

        let query = if let Some(actor) = actor {
            let actor = actor.to_string();
            query.filter(move |q| q.field("actor").eq(actor.clone()))
        } else {
            query
        };

        query
            .order_by([("startTime", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
