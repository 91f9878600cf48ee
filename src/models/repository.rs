// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Repository identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `owner/name` identifier of a repository.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryRef(String);

impl RepositoryRef {
    /// Parse an `owner/name` string. Returns `None` unless there are exactly
    /// two non-empty segments.
    pub fn parse(full_name: &str) -> Option<Self> {
        let full_name = full_name.trim();
        let (owner, name) = full_name.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self(full_name.to_string()))
    }

    /// Derive the repository from either a full name (`owner/name`) or a
    /// REST API URL (`https://api.github.com/repos/owner/name`).
    pub fn from_reference(reference: &str) -> Option<Self> {
        match reference.split_once("/repos/") {
            Some((_, rest)) => {
                let mut segments = rest.split('/');
                let owner = segments.next()?;
                let name = segments.next()?;
                Self::parse(&format!("{}/{}", owner, name))
            }
            None => Self::parse(reference),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn owner(&self) -> &str {
        self.0.split_once('/').map(|(owner, _)| owner).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.0.split_once('/').map(|(_, name)| name).unwrap_or("")
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Repository identity attached to commits and issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    #[serde(default)]
    pub name: String,
    pub name_with_owner: String,
}

impl From<&RepositoryRef> for RepositoryInfo {
    fn from(repo: &RepositoryRef) -> Self {
        Self {
            name: repo.name().to_string(),
            name_with_owner: repo.as_str().to_string(),
        }
    }
}
