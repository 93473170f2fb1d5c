// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Story history: local/remote reconciliation and the save flow.
//!
//! The local cache is the durability guarantee and is written first,
//! always. The remote store only exists for subscribers and wins on
//! conflict when present. Remote mirroring (story row, then the
//! illustration) is best-effort: failures are logged and retryable,
//! never rolled back into the local write.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures_util::{stream, StreamExt};

use crate::error::{AppError, Result};
use crate::models::Story;
use crate::services::entitlement::EntitlementStatus;
use crate::session::{Session, SessionProvider};
use crate::store::traits::{ObjectStore, StoryStore};
use crate::store::LocalStoryCache;

/// Concurrent remote mirrors during a backfill sync.
const MAX_CONCURRENT_MIRRORS: usize = 4;

/// Identity of a story for reconciliation purposes.
///
/// Title plus calendar date catches the same story arriving via both
/// the local-immediate-write and the remote-sync paths (their exact
/// timestamps differ). The word set keeps two distinct same-day
/// stories with an identical auto-picked title apart.
type DedupeKey = (String, NaiveDate, Vec<String>);

fn dedupe_key(story: &Story) -> DedupeKey {
    (
        story.title.clone(),
        story.created_at.date_naive(),
        story.words.clone(),
    )
}

/// Merge a locally cached story list with the remote authoritative
/// list.
///
/// Remote wins for shared keys; local-only entries are kept. The
/// result is ordered most-recent-first with `is_last_generated` set
/// on index 0 only. Idempotent: merging the result with the same
/// remote list again changes nothing.
pub fn merge(local: &[Story], remote: &[Story]) -> Vec<Story> {
    let mut by_key: HashMap<DedupeKey, Story> = HashMap::new();
    for story in local {
        by_key.insert(dedupe_key(story), story.clone());
    }
    for story in remote {
        by_key.insert(dedupe_key(story), story.clone());
    }

    let mut merged: Vec<Story> = by_key.into_values().collect();
    merged.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    for story in merged.iter_mut() {
        story.is_last_generated = false;
    }
    if let Some(first) = merged.first_mut() {
        first.is_last_generated = true;
    }
    merged
}

/// History service: save flow, reconciliation, image mirroring.
#[derive(Clone)]
pub struct HistoryService {
    sessions: Arc<dyn SessionProvider>,
    stories: Arc<dyn StoryStore>,
    objects: Arc<dyn ObjectStore>,
    cache: LocalStoryCache,
}

impl HistoryService {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        stories: Arc<dyn StoryStore>,
        objects: Arc<dyn ObjectStore>,
        cache: LocalStoryCache,
    ) -> Self {
        Self {
            sessions,
            stories,
            objects,
            cache,
        }
    }

    async fn require_session(&self) -> Result<Session> {
        self.sessions.session().await.ok_or(AppError::AuthRequired)
    }

    /// Persist a newly generated story.
    ///
    /// The local write happens first and is the only one that can
    /// fail this call. For subscribers the story is then mirrored to
    /// the remote store; a mirror failure is logged and left for a
    /// later [`sync_to_remote`](Self::sync_to_remote).
    pub async fn save_story(&self, story: &Story, status: EntitlementStatus) -> Result<()> {
        self.cache.upsert_front(story).await?;
        tracing::info!(story_id = %story.id, "Story saved locally");

        if status == EntitlementStatus::Subscriber {
            if let Err(e) = self.mirror_story(story).await {
                tracing::warn!(story_id = %story.id, error = %e, "Remote mirror failed");
            }
        }
        Ok(())
    }

    /// Mirror one story to the remote store, then its illustration to
    /// durable storage.
    pub async fn mirror_story(&self, story: &Story) -> Result<()> {
        let session = self.require_session().await?;

        let remote_id = self
            .stories
            .save_story(&session.access_token, &session.user_id, story)
            .await?;
        tracing::debug!(story_id = %story.id, remote_id = %remote_id, "Story mirrored");

        if !story.image_url.is_empty() {
            self.mirror_image(&session, &remote_id, &story.image_url)
                .await?;
        }
        Ok(())
    }

    /// Two-phase illustration mirror: fetch the generated image into
    /// a transient local file, upload it under a user/story scoped
    /// key, record the row, delete the transient file. Any failing
    /// phase aborts the mirror; the story text already saved is
    /// untouched.
    async fn mirror_image(&self, session: &Session, story_id: &str, image_url: &str) -> Result<()> {
        let bytes = self.objects.download(image_url).await?;

        tokio::fs::create_dir_all(self.cache.dir())
            .await
            .map_err(|e| AppError::Storage(format!("failed to create cache dir: {e}")))?;
        let transient = self.cache.dir().join(format!("story-{}.png", story_id));
        tokio::fs::write(&transient, &bytes)
            .await
            .map_err(|e| AppError::Storage(format!("failed to write transient image: {e}")))?;

        let key = format!(
            "{}/{}/{}.png",
            urlencoding::encode(&session.user_id),
            urlencoding::encode(story_id),
            Utc::now().timestamp_millis()
        );

        let upload = async {
            let data = tokio::fs::read(&transient)
                .await
                .map_err(|e| AppError::Storage(format!("failed to read transient image: {e}")))?;
            self.objects
                .upload(&session.access_token, &key, &data, "image/png")
                .await?;
            self.stories
                .record_image(&session.access_token, &session.user_id, story_id, &key)
                .await
        }
        .await;

        // The transient file goes away on success and failure alike.
        if let Err(e) = tokio::fs::remove_file(&transient).await {
            tracing::debug!(path = %transient.display(), error = %e, "transient image cleanup failed");
        }

        upload?;
        tracing::info!(story_id, key = %key, "Illustration mirrored");
        Ok(())
    }

    /// Load the reconciled history for display.
    ///
    /// Subscribers get the merged local+remote view (and the cache is
    /// refreshed with it); everyone else gets the normalized local
    /// list. A remote fetch failure degrades to the local view.
    pub async fn history(&self, status: EntitlementStatus) -> Result<Vec<Story>> {
        let local = self.cache.load().await;

        if status != EntitlementStatus::Subscriber {
            return Ok(merge(&local, &[]));
        }

        let session = self.require_session().await?;
        let remote = match self
            .stories
            .list_stories(&session.access_token, &session.user_id)
            .await
        {
            Ok(remote) => remote,
            Err(e) if e.is_retryable() => {
                tracing::warn!(error = %e, "Remote history unavailable, using local cache");
                return Ok(merge(&local, &[]));
            }
            Err(e) => return Err(e),
        };

        let merged = merge(&local, &remote);
        self.cache.save_all(&merged).await?;
        Ok(merged)
    }

    /// Look up one cached story (offline read path).
    pub async fn load_story(&self, id: &str) -> Option<Story> {
        self.cache.find(id).await
    }

    /// Backfill local-only stories to the remote store (e.g. right
    /// after a subscription purchase). Returns the number mirrored.
    pub async fn sync_to_remote(&self) -> Result<usize> {
        let session = self.require_session().await?;
        let local = self.cache.load().await;
        let remote = self
            .stories
            .list_stories(&session.access_token, &session.user_id)
            .await?;

        let remote_keys: std::collections::HashSet<DedupeKey> =
            remote.iter().map(dedupe_key).collect();
        let missing: Vec<Story> = local
            .into_iter()
            .filter(|story| !remote_keys.contains(&dedupe_key(story)))
            .collect();

        let mirrored = stream::iter(missing)
            .map(|story| {
                let service = self.clone();
                async move {
                    match service.mirror_story(&story).await {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!(story_id = %story.id, error = %e, "Backfill mirror failed");
                            false
                        }
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_MIRRORS)
            .collect::<Vec<bool>>()
            .await
            .into_iter()
            .filter(|ok| *ok)
            .count();

        tracing::info!(mirrored, "Local history synced to remote");
        Ok(mirrored)
    }

    /// Drop the local cache (account deletion).
    pub async fn clear_local(&self) -> Result<()> {
        self.cache.clear().await
    }
}
