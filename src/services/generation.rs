// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Story generation orchestration.
//!
//! Handles the core workflow:
//! 1. Validate the five magic words
//! 2. Consume a credit (fail closed: no credit, no generation)
//! 3. Resolve a morale and illustration style from the catalog
//! 4. Call the remote generation service
//! 5. Save the result to history (local first, remote for subscribers)

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::catalog;
use crate::models::story::WORD_COUNT;
use crate::models::Story;
use crate::services::entitlement;
use crate::services::history::HistoryService;
use crate::services::ledger::CreditLedger;
use crate::session::SessionProvider;
use crate::store::traits::{GenerationBackend, GenerationPayload, ProfileStore};

/// A user's story request, before catalog resolution.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateStoryRequest {
    /// The five magic words
    #[validate(length(equal = 5, message = "exactly five magic words are required"))]
    pub words: Vec<String>,
    /// Morale category, or `None` for a draw across the catalog
    pub theme: Option<String>,
    /// Illustration style category, or `None` for a draw
    pub style: Option<String>,
    /// Weave the family names into the story
    #[serde(default)]
    pub become_heroes: bool,
}

impl GenerateStoryRequest {
    pub fn new(words: Vec<String>) -> Self {
        Self {
            words,
            theme: None,
            style: None,
            become_heroes: false,
        }
    }
}

/// Story generation service.
pub struct StoryGenerator {
    sessions: Arc<dyn SessionProvider>,
    profiles: Arc<dyn ProfileStore>,
    ledger: CreditLedger,
    generator: Arc<dyn GenerationBackend>,
    history: HistoryService,
    /// Per-user guard against double submission while a generation
    /// is pending. The ledger only guards the authoritative counter.
    in_flight: Arc<DashMap<String, ()>>,
}

impl StoryGenerator {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        profiles: Arc<dyn ProfileStore>,
        ledger: CreditLedger,
        generator: Arc<dyn GenerationBackend>,
        history: HistoryService,
    ) -> Self {
        Self {
            sessions,
            profiles,
            ledger,
            generator,
            history,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Generate a story from five words.
    ///
    /// Credit consumption happens-before the generation request; the
    /// history save happens-after a successful response.
    pub async fn generate(&self, request: &GenerateStoryRequest) -> Result<Story> {
        // 1. Validate the request
        request
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let words: Vec<String> = request.words.iter().map(|w| w.trim().to_string()).collect();
        if words.iter().any(|w| w.is_empty()) {
            return Err(AppError::BadRequest(
                "all five magic words must be filled in".to_string(),
            ));
        }
        debug_assert_eq!(words.len(), WORD_COUNT);

        let session = self.sessions.session().await.ok_or(AppError::AuthRequired)?;

        // One generation per user at a time; the guard releases when
        // this call returns, success or not.
        let _guard = InFlightGuard::acquire(&self.in_flight, &session.user_id)?;

        // 2. Consume a credit against the authoritative balance
        self.ledger.check_and_consume().await?;

        let profile = self
            .profiles
            .get_profile(&session.access_token, &session.user_id)
            .await?;
        let status = entitlement::evaluate(profile.as_ref(), Utc::now());

        // 3. Resolve catalog entries
        let morales = catalog::morales_for(request.theme.as_deref());
        let styles = catalog::styles_for(request.style.as_deref());
        let payload = GenerationPayload {
            words: words.clone(),
            morale: (*catalog::pick_random(&morales)).to_string(),
            style: (*catalog::pick_random(&styles)).to_string(),
            become_heroes: request.become_heroes,
        };

        tracing::info!(user_id = %session.user_id, words = ?payload.words, "Generating story");

        // 4. Call the generation service
        let generated = self.generator.generate(&session.access_token, &payload).await?;

        // 5. Save to history
        let story = Story::from_generated(generated, words, Utc::now());
        self.history.save_story(&story, status).await?;

        tracing::info!(
            user_id = %session.user_id,
            story_id = %story.id,
            status = status.as_str(),
            "Story generated"
        );
        Ok(story)
    }
}

/// RAII entry in the per-user in-flight map.
struct InFlightGuard<'a> {
    map: &'a DashMap<String, ()>,
    key: String,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(map: &'a DashMap<String, ()>, key: &str) -> Result<Self> {
        if map.insert(key.to_string(), ()).is_some() {
            return Err(AppError::Conflict(
                "a story is already being generated".to_string(),
            ));
        }
        Ok(Self {
            map,
            key: key.to_string(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}
