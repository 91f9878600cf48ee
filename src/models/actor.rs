// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Actor (user or organization) whose activity is queried.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Whether a login belongs to an organization or an individual user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActorKind {
    User,
    Organization,
}

/// A classified actor, valid for the duration of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Actor {
    pub login: String,
    pub kind: ActorKind,
}

impl Actor {
    pub fn user(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            kind: ActorKind::User,
        }
    }

    pub fn organization(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            kind: ActorKind::Organization,
        }
    }

    /// Whether a commit author login belongs to this actor.
    ///
    /// Organizations keep every author; users keep only their own commits,
    /// compared case-insensitively. Commits whose author has no GitHub account
    /// never match a user.
    pub fn owns_commit(&self, author_login: Option<&str>) -> bool {
        match self.kind {
            ActorKind::Organization => true,
            ActorKind::User => {
                author_login.is_some_and(|login| login.eq_ignore_ascii_case(&self.login))
            }
        }
    }
}

/// Maximum length of a GitHub login.
pub const MAX_LOGIN_LEN: usize = 39;

/// Check that a string looks like a GitHub login.
///
/// Logins are 1-39 ASCII alphanumerics or single hyphens, not starting or
/// ending with a hyphen.
pub fn is_valid_login(login: &str) -> bool {
    !login.is_empty()
        && login.len() <= MAX_LOGIN_LEN
        && !login.starts_with('-')
        && !login.ends_with('-')
        && !login.contains("--")
        && login
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_keeps_every_author() {
        let org = Actor::organization("acme");
        assert!(org.owns_commit(Some("bob")));
        assert!(org.owns_commit(None));
    }

    #[test]
    fn test_user_matches_case_insensitively() {
        let alice = Actor::user("Alice");
        assert!(alice.owns_commit(Some("alice")));
        assert!(alice.owns_commit(Some("ALICE")));
        assert!(!alice.owns_commit(Some("bob")));
        assert!(!alice.owns_commit(None));
    }

    #[test]
    fn test_login_validation() {
        assert!(is_valid_login("octocat"));
        assert!(is_valid_login("my-org-2"));
        assert!(!is_valid_login(""));
        assert!(!is_valid_login("-leading"));
        assert!(!is_valid_login("trailing-"));
        assert!(!is_valid_login("double--hyphen"));
        assert!(!is_valid_login("has/slash"));
        assert!(!is_valid_login(&"a".repeat(40)));
    }
}
