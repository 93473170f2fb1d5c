// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error taxonomy.
//!
//! All remote-store and transport failures are converted to this
//! taxonomy at the client boundary; raw transport errors never reach
//! the UI layer directly.

/// Application error type consumed by the embedding UI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No valid session. The UI redirects to login; never retried
    /// automatically.
    #[error("Authentication required")]
    AuthRequired,

    /// Expected business state: the credit balance is exhausted. The
    /// UI offers the ad-reward or subscription upsell choice.
    #[error("No credits left")]
    NoCreditsLeft,

    /// Operation reserved for subscribers.
    #[error("Subscription required: {0}")]
    SubscriptionRequired(String),

    /// Network failure or server 5xx. Safe to retry manually.
    #[error("Transient error: {0}")]
    Transient(String),

    /// Duplicate record (e.g. a story saved twice). Resolved by the
    /// history dedupe rule, not surfaced to the user.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The ad provider failed to deliver a creative. Never blocks the
    /// primary flow.
    #[error("Ad unavailable")]
    AdUnavailable,

    /// Invalid request. May carry a server-side validation message
    /// that is itself user-appropriate.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Classified backend API error.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Object storage error (illustration upload/download).
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Marker the backend uses in 403 bodies when the credit balance
    /// is exhausted.
    pub const NO_CREDITS_MARKER: &'static str = "no_credits_left";

    /// Whether a manual retry of the same call can reasonably succeed.
    ///
    /// `AuthRequired` needs a re-login and `NoCreditsLeft` needs user
    /// action; neither is retryable as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Transient(_) | AppError::Storage(_))
    }

    /// Short, actionable message for the UI. Raw error text is only
    /// passed through where the server message is user-appropriate.
    pub fn user_message(&self) -> String {
        match self {
            AppError::AuthRequired => "Please sign in to continue.".to_string(),
            AppError::NoCreditsLeft => {
                "You are out of plumettes. Watch an ad or subscribe to keep going.".to_string()
            }
            AppError::SubscriptionRequired(_) => "This feature is for subscribers.".to_string(),
            AppError::AdUnavailable => "No ad is available right now.".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Transient(_)
            | AppError::Conflict(_)
            | AppError::Backend(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Result type alias for the service layer.
pub type Result<T> = std::result::Result<T, AppError>;
