// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Plumette: bedtime stories from five magic words
//!
//! This crate provides the entitlement/credit accounting and story
//! history core of the Plumette app: who may generate a story
//! (subscription, daily recharge, ad rewards), and how the offline
//! local history stays consistent with the remote server-of-record.
//!
//! Screens, navigation, and the ad/IAP/auth SDKs live in the
//! embedding app and reach the core through the capability traits in
//! [`session`] and [`store::traits`].

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod store;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use services::{
    CreditLedger, HistoryService, ProfileService, RewardGrantCoordinator, StoryGenerator,
};
use session::SessionProvider;
use store::traits::{GenerationBackend, ObjectStore, ProfileStore, StoryStore};
use store::{BackendClient, LocalStoryCache};

/// Explicitly constructed application core.
///
/// All collaborators are injected here; nothing in the crate holds
/// import-time singletons. Lifecycle is tied to the embedding app's
/// start/stop.
pub struct AppCore {
    pub config: Config,
    pub profiles: ProfileService,
    pub ledger: CreditLedger,
    pub generator: StoryGenerator,
    pub history: HistoryService,
    pub rewards: RewardGrantCoordinator,
}

impl AppCore {
    /// Wire the core against the production backend client.
    pub fn new(config: Config, sessions: Arc<dyn SessionProvider>) -> Self {
        let client = Arc::new(BackendClient::new(&config));
        Self::with_stores(
            config,
            sessions,
            client.clone(),
            client.clone(),
            client.clone(),
            client,
        )
    }

    /// Wire the core against explicit store implementations (tests,
    /// offline mode).
    pub fn with_stores(
        config: Config,
        sessions: Arc<dyn SessionProvider>,
        profiles: Arc<dyn ProfileStore>,
        stories: Arc<dyn StoryStore>,
        objects: Arc<dyn ObjectStore>,
        generation: Arc<dyn GenerationBackend>,
    ) -> Self {
        let cache = LocalStoryCache::new(config.cache_dir.clone());
        let ledger = CreditLedger::new(sessions.clone(), profiles.clone());
        let history = HistoryService::new(sessions.clone(), stories, objects, cache.clone());
        let generator = StoryGenerator::new(
            sessions.clone(),
            profiles.clone(),
            ledger.clone(),
            generation,
            history.clone(),
        );
        let profile_service = ProfileService::new(sessions, profiles, ledger.clone(), cache);
        let rewards = RewardGrantCoordinator::new(config.ad_fallback);

        Self {
            config,
            profiles: profile_service,
            ledger,
            generator,
            history,
            rewards,
        }
    }
}

/// Initialize structured JSON logging for the embedding app.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("plumette_core=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
