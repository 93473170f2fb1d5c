//! Application configuration loaded from environment variables.
//!
//! The embedding app loads this once at startup; nothing here performs
//! network I/O.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend API (profiles, credits, stories)
    pub backend_url: String,
    /// Public API key sent with every backend request
    pub backend_api_key: String,
    /// Object storage bucket for story illustrations
    pub image_bucket: String,
    /// Directory for the local story cache and transient image files
    pub cache_dir: PathBuf,
    /// Bounded fallback window for the reward-ad flow
    pub ad_fallback: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:54321".to_string(),
            backend_api_key: "test_api_key".to_string(),
            image_bucket: "story-images".to_string(),
            cache_dir: std::env::temp_dir().join("plumette-test-cache"),
            ad_fallback: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            backend_url: env::var("PLUMETTE_BACKEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("PLUMETTE_BACKEND_URL"))?,
            backend_api_key: env::var("PLUMETTE_BACKEND_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("PLUMETTE_BACKEND_API_KEY"))?,
            image_bucket: env::var("PLUMETTE_IMAGE_BUCKET")
                .unwrap_or_else(|_| "story-images".to_string()),
            cache_dir: env::var("PLUMETTE_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".plumette-cache")),
            ad_fallback: Duration::from_secs(
                env::var("PLUMETTE_AD_FALLBACK_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            ),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
