// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory backend implementing the remote store traits.
//!
//! Backs the integration tests and offline development. The guarded
//! credit operations hold a single lock across the read and the
//! write, matching the atomicity the real backend provides, so the
//! double-spend tests exercise the same contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::profile::DAILY_REWARD_CAP;
use crate::models::{Profile, ProfilePatch, Story};
use crate::store::traits::{CreditDecision, ProfileStore, StoryStore};

/// Durable illustration row, as the backend records it.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub user_id: String,
    pub story_id: String,
    pub image_path: String,
}

#[derive(Default)]
struct MemoryState {
    profiles: HashMap<String, Profile>,
    stories: HashMap<String, Vec<Story>>,
    images: Vec<ImageRecord>,
    next_story_id: u64,
}

/// In-memory profile and story store.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    offline: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a backend outage; every operation fails with a
    /// retryable error while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Transient("backend unreachable".to_string()));
        }
        Ok(())
    }

    /// Seed a profile (test setup / first-authentication hook).
    pub async fn insert_profile(&self, profile: Profile) {
        self.state
            .lock()
            .await
            .profiles
            .insert(profile.user_id.clone(), profile);
    }

    /// Current profile snapshot, for assertions.
    pub async fn profile(&self, user_id: &str) -> Option<Profile> {
        self.state.lock().await.profiles.get(user_id).cloned()
    }

    /// Remote stories for a user, for assertions.
    pub async fn stories_for(&self, user_id: &str) -> Vec<Story> {
        self.state
            .lock()
            .await
            .stories
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Recorded illustration rows, for assertions.
    pub async fn image_records(&self) -> Vec<ImageRecord> {
        self.state.lock().await.images.clone()
    }
}

#[async_trait]
impl ProfileStore for MemoryBackend {
    async fn get_profile(
        &self,
        _access_token: &str,
        user_id: &str,
    ) -> Result<Option<Profile>, AppError> {
        self.check_online()?;
        Ok(self.state.lock().await.profiles.get(user_id).cloned())
    }

    async fn update_profile(
        &self,
        _access_token: &str,
        user_id: &str,
        patch: &ProfilePatch,
    ) -> Result<Profile, AppError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let profile = state
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| AppError::Backend(format!("profile {} not found", user_id)))?;

        if let Some(first_names) = &patch.first_names {
            profile.first_names = first_names.clone();
        }
        if let Some(children_names) = &patch.children_names {
            profile.children_names = children_names.clone();
        }
        if let Some(avatar_url) = &patch.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }

        Ok(profile.clone())
    }

    async fn check_and_decrement(
        &self,
        _access_token: &str,
        user_id: &str,
    ) -> Result<CreditDecision, AppError> {
        self.check_online()?;
        // Single lock across read and write: the guarded update.
        let mut state = self.state.lock().await;
        let profile = state
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| AppError::Backend(format!("profile {} not found", user_id)))?;

        if profile.credits_left == 0 {
            return Ok(CreditDecision::Denied);
        }
        profile.credits_left -= 1;
        Ok(CreditDecision::Allowed)
    }

    async fn refresh_recharge(
        &self,
        _access_token: &str,
        user_id: &str,
    ) -> Result<Profile, AppError> {
        self.check_online()?;
        let now = Utc::now();
        let mut state = self.state.lock().await;
        let profile = state
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| AppError::Backend(format!("profile {} not found", user_id)))?;

        // Guard on the stored timestamp, never the client clock alone.
        let due = match profile.last_credit_recharge {
            None => true,
            Some(last) => now - last >= Duration::hours(24),
        };
        if due {
            profile.credits_left += 1;
            profile.last_credit_recharge = Some(now);
            profile.rewarded_today = 0;
            tracing::debug!(user_id, credits = profile.credits_left, "Daily credit granted");
        }

        Ok(profile.clone())
    }

    async fn grant_reward(&self, _access_token: &str, user_id: &str) -> Result<Profile, AppError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let profile = state
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| AppError::Backend(format!("profile {} not found", user_id)))?;

        if profile.rewarded_today >= DAILY_REWARD_CAP {
            return Err(AppError::BadRequest(
                "Daily reward limit reached".to_string(),
            ));
        }
        profile.credits_left += 1;
        profile.rewarded_today += 1;
        Ok(profile.clone())
    }

    async fn delete_user_data(&self, _access_token: &str, user_id: &str) -> Result<usize, AppError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let mut deleted = 0;

        if state.profiles.remove(user_id).is_some() {
            deleted += 1;
        }
        if let Some(stories) = state.stories.remove(user_id) {
            deleted += stories.len();
        }
        let before = state.images.len();
        state.images.retain(|record| record.user_id != user_id);
        deleted += before - state.images.len();

        tracing::info!(user_id, deleted, "User data deletion complete");
        Ok(deleted)
    }
}

#[async_trait]
impl StoryStore for MemoryBackend {
    async fn save_story(
        &self,
        _access_token: &str,
        user_id: &str,
        story: &Story,
    ) -> Result<String, AppError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        state.next_story_id += 1;
        let remote_id = format!("srv-{}", state.next_story_id);

        let mut stored = story.clone();
        stored.id = remote_id.clone();
        stored.is_last_generated = false;
        state
            .stories
            .entry(user_id.to_string())
            .or_default()
            .push(stored);

        Ok(remote_id)
    }

    async fn list_stories(
        &self,
        _access_token: &str,
        user_id: &str,
    ) -> Result<Vec<Story>, AppError> {
        self.check_online()?;
        let mut stories = self
            .state
            .lock()
            .await
            .stories
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stories)
    }

    async fn record_image(
        &self,
        _access_token: &str,
        user_id: &str,
        story_id: &str,
        image_path: &str,
    ) -> Result<(), AppError> {
        self.check_online()?;
        self.state.lock().await.images.push(ImageRecord {
            user_id: user_id.to_string(),
            story_id: story_id.to_string(),
            image_path: image_path.to_string(),
        });
        Ok(())
    }
}
