// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test doubles and wiring for the integration suites.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use plumette_core::config::Config;
use plumette_core::error::AppError;
use plumette_core::models::GeneratedStory;
use plumette_core::session::StaticSessionProvider;
use plumette_core::store::traits::{GenerationBackend, GenerationPayload, ObjectStore};
use plumette_core::store::MemoryBackend;
use plumette_core::AppCore;

/// Deterministic generation backend: the title and illustration URL
/// derive from the first word.
pub struct CannedGenerator;

#[async_trait]
impl GenerationBackend for CannedGenerator {
    async fn generate(
        &self,
        _access_token: &str,
        payload: &GenerationPayload,
    ) -> Result<GeneratedStory, AppError> {
        let hero = payload.words.first().cloned().unwrap_or_default();
        Ok(GeneratedStory {
            title: format!("The Tale of the {}", hero),
            content: format!(
                "Once upon a time, a {} set out to find {}. {}",
                hero,
                payload.words.last().cloned().unwrap_or_default(),
                payload.morale
            ),
            illustration: format!("https://img.example.test/generated/{}.png", hero),
        })
    }
}

/// Object store that records uploads and serves canned image bytes.
#[derive(Default)]
pub struct RecordingObjectStore {
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for RecordingObjectStore {
    async fn download(&self, url: &str) -> Result<Vec<u8>, AppError> {
        if url.is_empty() {
            return Err(AppError::Storage("empty image URL".to_string()));
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn upload(
        &self,
        _access_token: &str,
        key: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<(), AppError> {
        assert!(!bytes.is_empty());
        self.uploads.lock().await.push(key.to_string());
        Ok(())
    }
}

/// A fully wired core over the in-memory backend.
pub struct TestApp {
    pub core: AppCore,
    pub backend: Arc<MemoryBackend>,
    pub sessions: Arc<StaticSessionProvider>,
    pub objects: Arc<RecordingObjectStore>,
    _cache_dir: tempfile::TempDir,
}

#[allow(dead_code)]
pub fn test_app() -> TestApp {
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        cache_dir: cache_dir.path().to_path_buf(),
        ..Config::default()
    };

    let backend = Arc::new(MemoryBackend::new());
    let sessions = Arc::new(StaticSessionProvider::new());
    let objects = Arc::new(RecordingObjectStore::default());

    let core = AppCore::with_stores(
        config,
        sessions.clone(),
        backend.clone(),
        backend.clone(),
        objects.clone(),
        Arc::new(CannedGenerator),
    );

    TestApp {
        core,
        backend,
        sessions,
        objects,
        _cache_dir: cache_dir,
    }
}
