//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; handlers only ever see the typed
//! `Config` struct.

use std::env;

/// Which remote fetch variant the sync pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSource {
    /// REST `GET /users/{username}/events` (discrete event list).
    Events,
    /// GraphQL contribution/commit/pull-request graph.
    Graph,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// GitHub REST API base URL
    pub github_api_url: String,
    /// GitHub GraphQL endpoint
    pub github_graphql_url: String,
    /// Which fetch variant the sync pipeline uses
    pub sync_source: SyncSource,
    /// Seconds between auto-sync ticks (default 12 hours)
    pub sync_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let sync_source = match env::var("GITHUB_SYNC_SOURCE").as_deref() {
            Ok("events") => SyncSource::Events,
            Ok("graph") | Err(_) => SyncSource::Graph,
            Ok(other) => return Err(ConfigError::Invalid("GITHUB_SYNC_SOURCE", other.to_string())),
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            github_api_url: env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            github_graphql_url: env::var("GITHUB_GRAPHQL_URL")
                .unwrap_or_else(|_| "https://api.github.com/graphql".to_string()),
            sync_source,
            sync_interval_secs: env::var("SYNC_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(12 * 60 * 60),
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            github_api_url: "https://api.github.com".to_string(),
            github_graphql_url: "https://api.github.com/graphql".to_string(),
            sync_source: SyncSource::Graph,
            sync_interval_secs: 12 * 60 * 60,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
