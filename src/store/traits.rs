// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Capability traits for the remote backend.
//!
//! Every method takes the caller's bearer token; implementations are
//! stateless with respect to authentication. Production traffic goes
//! through [`BackendClient`](crate::store::BackendClient); tests and
//! offline mode use [`MemoryBackend`](crate::store::MemoryBackend).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{GeneratedStory, Profile, ProfilePatch, Story};

/// Outcome of the atomic credit check-and-decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditDecision {
    /// A credit was available and has been consumed.
    Allowed,
    /// The balance was exhausted; nothing was mutated.
    Denied,
}

/// Remote profile and credit store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile by user id. `None` means no profile exists yet.
    async fn get_profile(&self, access_token: &str, user_id: &str) -> Result<Option<Profile>>;

    /// Apply a personalization patch and return the updated profile.
    async fn update_profile(
        &self,
        access_token: &str,
        user_id: &str,
        patch: &ProfilePatch,
    ) -> Result<Profile>;

    /// Atomically decrement one credit if the stored balance allows.
    ///
    /// The read and the decrement are a single update guarded by the
    /// stored count, so two concurrent calls against a balance of 1
    /// yield exactly one `Allowed`.
    async fn check_and_decrement(&self, access_token: &str, user_id: &str)
        -> Result<CreditDecision>;

    /// Grant the daily free credit if 24h have elapsed since the
    /// stored `last_credit_recharge`. Idempotent within a window.
    async fn refresh_recharge(&self, access_token: &str, user_id: &str) -> Result<Profile>;

    /// Grant one ad-reward credit. Rejects once the daily reward cap
    /// is reached; the authorization check is server-side.
    async fn grant_reward(&self, access_token: &str, user_id: &str) -> Result<Profile>;

    /// Delete the profile and all dependent records. Returns the
    /// number of records removed.
    async fn delete_user_data(&self, access_token: &str, user_id: &str) -> Result<usize>;
}

/// Remote story store (server-of-record for subscribers).
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Persist a story and return its server-assigned id.
    async fn save_story(&self, access_token: &str, user_id: &str, story: &Story)
        -> Result<String>;

    /// All stories for a user, most recent first.
    async fn list_stories(&self, access_token: &str, user_id: &str) -> Result<Vec<Story>>;

    /// Record a durable illustration path for a mirrored story.
    async fn record_image(
        &self,
        access_token: &str,
        user_id: &str,
        story_id: &str,
        image_path: &str,
    ) -> Result<()>;
}

/// Remote object storage for story illustrations.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch raw image bytes from a generation-backend URL.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;

    /// Upload bytes to durable storage under the given object key.
    async fn upload(
        &self,
        access_token: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<()>;
}

/// Resolved story-generation payload sent to the remote service.
///
/// `morale` and `style` are concrete catalog entries, already drawn
/// from the user's selected categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationPayload {
    pub words: Vec<String>,
    pub morale: String,
    pub style: String,
    pub become_heroes: bool,
}

/// Remote story-generation service.
///
/// Treated as a black box; no retry policy is implied beyond what the
/// caller chooses.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, access_token: &str, payload: &GenerationPayload)
        -> Result<GeneratedStory>;
}
