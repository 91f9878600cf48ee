// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Configuration is read once at startup and handed to each component at
//! construction. Nothing re-reads the environment per request.

use std::env;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Base URL of the GitHub REST API (GraphQL lives at `{base}/graphql`)
    pub github_api_url: String,
    /// Base URL of the Anthropic API
    pub anthropic_api_url: String,
    /// Model used for summary generation
    pub anthropic_model: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Public base URL used when building share links
    pub app_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Number of repositories fetched concurrently per batch
    pub commit_batch_size: usize,
    /// Fixed pause between commit-fetch batches
    pub commit_batch_delay: Duration,

    // --- Secrets ---
    /// Bearer token for the GitHub API
    pub github_token: String,
    /// Anthropic API key; summaries are unavailable without it
    pub anthropic_api_key: Option<String>,
}

/// Default number of repositories per commit-fetch batch.
pub const DEFAULT_COMMIT_BATCH_SIZE: usize = 3;
/// Default pause between commit-fetch batches, in milliseconds.
pub const DEFAULT_COMMIT_BATCH_DELAY_MS: u64 = 1000;

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            github_api_url: "https://api.github.com".to_string(),
            anthropic_api_url: "https://api.anthropic.com".to_string(),
            anthropic_model: "claude-3-opus-20240229".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            app_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            commit_batch_size: DEFAULT_COMMIT_BATCH_SIZE,
            commit_batch_delay: Duration::ZERO,
            github_token: "test_github_token".to_string(),
            anthropic_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let commit_batch_size = match env::var("COMMIT_BATCH_SIZE") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::Invalid("COMMIT_BATCH_SIZE"))?,
            Err(_) => DEFAULT_COMMIT_BATCH_SIZE,
        };

        let commit_batch_delay_ms = match env::var("COMMIT_BATCH_DELAY_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("COMMIT_BATCH_DELAY_MS"))?,
            Err(_) => DEFAULT_COMMIT_BATCH_DELAY_MS,
        };

        Ok(Self {
            github_api_url: env::var("GITHUB_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            anthropic_api_url: env::var("ANTHROPIC_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-3-opus-20240229".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            app_url: env::var("APP_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            commit_batch_size,
            commit_batch_delay: Duration::from_millis(commit_batch_delay_ms),

            github_token: env::var("GITHUB_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GITHUB_TOKEN"))?,
            anthropic_api_key: env::var("ANTHROPIC_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("GITHUB_TOKEN", " ghp_test ");
        env::set_var("COMMIT_BATCH_SIZE", "5");
        env::set_var("COMMIT_BATCH_DELAY_MS", "250");
        env::set_var("GITHUB_API_URL", "http://127.0.0.1:9999/");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.github_token, "ghp_test");
        assert_eq!(config.commit_batch_size, 5);
        assert_eq!(config.commit_batch_delay, Duration::from_millis(250));
        assert_eq!(config.github_api_url, "http://127.0.0.1:9999");
        assert_eq!(config.port, 8080);

        env::remove_var("COMMIT_BATCH_SIZE");
        env::remove_var("COMMIT_BATCH_DELAY_MS");
        env::remove_var("GITHUB_API_URL");
    }
}
