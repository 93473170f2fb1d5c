//! Local story cache for offline-first history.
//!
//! Atomic write (tmp + rename) ensures we never read a half-written
//! file. A corrupted cache is treated as empty rather than an error;
//! the remote store is the recovery path for subscribers.

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::Story;

const CACHE_FILENAME: &str = "stories.json";

/// Device-scoped story cache backed by a JSON file.
#[derive(Debug, Clone)]
pub struct LocalStoryCache {
    dir: PathBuf,
}

impl LocalStoryCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the cache file and transient image files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self) -> PathBuf {
        self.dir.join(CACHE_FILENAME)
    }

    /// Load the cached story list, most recent first.
    ///
    /// Missing or corrupted cache files read as empty.
    pub async fn load(&self) -> Vec<Story> {
        let path = self.path();
        match tokio::fs::read_to_string(&path).await {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(stories) => stories,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupted story cache, ignoring");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read story cache");
                Vec::new()
            }
        }
    }

    /// Replace the whole cached list atomically.
    pub async fn save_all(&self, stories: &[Story]) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Storage(format!("failed to create cache dir: {e}")))?;

        let target = self.path();
        let tmp = self.dir.join(format!("{CACHE_FILENAME}.tmp"));

        let data = serde_json::to_string_pretty(stories)
            .map_err(|e| AppError::Storage(format!("failed to serialize story cache: {e}")))?;

        tokio::fs::write(&tmp, data.as_bytes())
            .await
            .map_err(|e| AppError::Storage(format!("failed to write tmp cache: {e}")))?;

        tokio::fs::rename(&tmp, &target)
            .await
            .map_err(|e| AppError::Storage(format!("failed to rename cache file: {e}")))?;

        tracing::debug!(path = %target.display(), count = stories.len(), "story cache written");
        Ok(())
    }

    /// Prepend a story, replacing any cached entry with the same id.
    pub async fn upsert_front(&self, story: &Story) -> Result<(), AppError> {
        let mut stories = self.load().await;
        stories.retain(|s| s.id != story.id);
        stories.insert(0, story.clone());
        self.save_all(&stories).await
    }

    /// Look up a single cached story by id.
    pub async fn find(&self, id: &str) -> Option<Story> {
        self.load().await.into_iter().find(|s| s.id == id)
    }

    /// Remove the cache file (account deletion).
    pub async fn clear(&self) -> Result<(), AppError> {
        match tokio::fs::remove_file(self.path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("failed to clear cache: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn story(id: &str, hour: u32) -> Story {
        Story {
            id: id.to_string(),
            title: format!("Story {}", id),
            content: "Once upon a time...".to_string(),
            image_url: String::new(),
            words: vec!["a", "b", "c", "d", "e"].into_iter().map(String::from).collect(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap(),
            is_last_generated: false,
        }
    }

    #[tokio::test]
    async fn write_and_read_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalStoryCache::new(dir.path());

        cache.save_all(&[story("1", 8), story("2", 9)]).await.unwrap();
        let loaded = cache.load().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "1");
    }

    #[tokio::test]
    async fn read_cache_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalStoryCache::new(dir.path());
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupted_cache_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join(CACHE_FILENAME), b"{not json")
            .await
            .unwrap();
        let cache = LocalStoryCache::new(dir.path());
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn upsert_front_replaces_same_id() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalStoryCache::new(dir.path());

        cache.upsert_front(&story("1", 8)).await.unwrap();
        cache.upsert_front(&story("2", 9)).await.unwrap();
        cache.upsert_front(&story("1", 10)).await.unwrap();

        let loaded = cache.load().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "1");
        assert_eq!(loaded[1].id, "2");
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalStoryCache::new(dir.path());
        cache.upsert_front(&story("1", 8)).await.unwrap();
        cache.clear().await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.load().await.is_empty());
    }
}
