// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Actor classification (organization vs. user).

use crate::models::{Actor, ActorKind};
use crate::services::GitHubClient;

/// Classify a login by querying the organization endpoint.
///
/// A successful lookup means organization. Any failure, including 404 and
/// transport errors, classifies as a user. There is no retry.
pub async fn classify_actor(github: &GitHubClient, login: &str) -> Actor {
    let kind = match github.get_organization(login).await {
        Ok(_) => ActorKind::Organization,
        Err(e) => {
            tracing::debug!(login, error = %e, "Organization lookup failed, treating as user");
            ActorKind::User
        }
    };

    tracing::info!(login, kind = ?kind, "Actor classified");

    Actor {
        login: login.to_string(),
        kind,
    }
}
