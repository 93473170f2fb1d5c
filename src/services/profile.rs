// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile service: load, personalization updates, account deletion.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{Profile, ProfilePatch};
use crate::services::entitlement::{self, EntitlementStatus};
use crate::services::ledger::CreditLedger;
use crate::services::recharge::{self, Countdown};
use crate::session::SessionProvider;
use crate::store::traits::ProfileStore;
use crate::store::LocalStoryCache;

/// A profile snapshot with its derived entitlement status.
#[derive(Debug, Clone)]
pub struct ProfileSnapshot {
    pub profile: Option<Profile>,
    pub status: EntitlementStatus,
}

impl ProfileSnapshot {
    fn guest() -> Self {
        Self {
            profile: None,
            status: EntitlementStatus::Guest,
        }
    }

    /// Countdown to the next free credit, for the badge display.
    pub fn recharge_countdown(&self, now: DateTime<Utc>) -> Countdown {
        recharge::time_until_next_recharge(
            self.profile.as_ref().and_then(|p| p.last_credit_recharge),
            now,
        )
    }
}

/// Profile management over the remote store.
#[derive(Clone)]
pub struct ProfileService {
    sessions: Arc<dyn SessionProvider>,
    profiles: Arc<dyn ProfileStore>,
    ledger: CreditLedger,
    cache: LocalStoryCache,
}

impl ProfileService {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        profiles: Arc<dyn ProfileStore>,
        ledger: CreditLedger,
        cache: LocalStoryCache,
    ) -> Self {
        Self {
            sessions,
            profiles,
            ledger,
            cache,
        }
    }

    /// Load the current profile and derive its entitlement status.
    ///
    /// Runs the opportunistic daily recharge first; when that fails
    /// the load degrades to a plain fetch so a backend hiccup never
    /// blocks the app. Callers re-run this on every app foreground.
    pub async fn load(&self) -> ProfileSnapshot {
        let Some(session) = self.sessions.session().await else {
            return ProfileSnapshot::guest();
        };

        let profile = match self.ledger.refresh_recharge().await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Recharge refresh failed, falling back to plain fetch");
                match self
                    .profiles
                    .get_profile(&session.access_token, &session.user_id)
                    .await
                {
                    Ok(profile) => profile,
                    Err(e) => {
                        tracing::warn!(error = %e, "Profile fetch failed");
                        return ProfileSnapshot::guest();
                    }
                }
            }
        };

        let status = entitlement::evaluate(profile.as_ref(), Utc::now());
        tracing::debug!(status = status.as_str(), "Profile loaded");
        ProfileSnapshot { profile, status }
    }

    /// Save personalization changes (avatar, family names).
    pub async fn update(&self, patch: &ProfilePatch) -> Result<Profile> {
        let session = self.sessions.session().await.ok_or(AppError::AuthRequired)?;
        self.profiles
            .update_profile(&session.access_token, &session.user_id, patch)
            .await
    }

    /// Delete the account: purge the remote profile with all
    /// dependent stories and images, then drop the local cache.
    /// Returns the number of remote records removed.
    pub async fn delete_account(&self) -> Result<usize> {
        let session = self.sessions.session().await.ok_or(AppError::AuthRequired)?;
        let deleted = self
            .profiles
            .delete_user_data(&session.access_token, &session.user_id)
            .await?;
        self.cache.clear().await?;
        tracing::info!(user_id = %session.user_id, deleted, "Account deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticSessionProvider;
    use crate::store::MemoryBackend;
    use chrono::Duration;

    fn service(
        backend: Arc<MemoryBackend>,
        sessions: Arc<StaticSessionProvider>,
        cache: LocalStoryCache,
    ) -> ProfileService {
        let ledger = CreditLedger::new(sessions.clone(), backend.clone());
        ProfileService::new(sessions, backend, ledger, cache)
    }

    #[tokio::test]
    async fn test_load_without_session_is_guest() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(
            Arc::new(MemoryBackend::new()),
            Arc::new(StaticSessionProvider::new()),
            LocalStoryCache::new(dir.path()),
        );

        let snapshot = svc.load().await;
        assert_eq!(snapshot.status, EntitlementStatus::Guest);
        assert!(snapshot.profile.is_none());
    }

    #[tokio::test]
    async fn test_guest_snapshot_has_unknown_countdown() {
        let snapshot = ProfileSnapshot::guest();
        assert_eq!(snapshot.recharge_countdown(Utc::now()), Countdown::Unknown);
    }

    #[tokio::test]
    async fn test_load_applies_due_recharge() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        let mut profile = Profile::new("user-1", Utc::now());
        profile.credits_left = 0;
        profile.last_credit_recharge = Some(Utc::now() - Duration::hours(25));
        backend.insert_profile(profile).await;

        let svc = service(
            backend,
            Arc::new(StaticSessionProvider::signed_in("user-1", "token")),
            LocalStoryCache::new(dir.path()),
        );

        let snapshot = svc.load().await;
        assert_eq!(snapshot.status, EntitlementStatus::Connected);
        assert_eq!(snapshot.profile.unwrap().credits_left, 1);
    }

    #[tokio::test]
    async fn test_load_degrades_to_guest_when_backend_down() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_profile(Profile::new("user-1", Utc::now())).await;
        backend.set_offline(true);

        let svc = service(
            backend,
            Arc::new(StaticSessionProvider::signed_in("user-1", "token")),
            LocalStoryCache::new(dir.path()),
        );

        let snapshot = svc.load().await;
        assert_eq!(snapshot.status, EntitlementStatus::Guest);
    }

    #[tokio::test]
    async fn test_update_personalization_fields() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_profile(Profile::new("user-1", Utc::now())).await;

        let svc = service(
            backend,
            Arc::new(StaticSessionProvider::signed_in("user-1", "token")),
            LocalStoryCache::new(dir.path()),
        );

        let patch = ProfilePatch {
            first_names: Some(vec!["Alex".to_string()]),
            children_names: Some(vec!["Lou".to_string(), "Mia".to_string()]),
            avatar_url: Some("avatar3.png".to_string()),
        };
        let updated = svc.update(&patch).await.unwrap();
        assert_eq!(updated.first_names, vec!["Alex"]);
        assert_eq!(updated.children_names.len(), 2);
        assert_eq!(updated.avatar_url.as_deref(), Some("avatar3.png"));
    }

    #[tokio::test]
    async fn test_delete_account_purges_remote_and_local() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_profile(Profile::new("user-1", Utc::now())).await;
        let cache = LocalStoryCache::new(dir.path());

        let svc = service(
            backend.clone(),
            Arc::new(StaticSessionProvider::signed_in("user-1", "token")),
            cache.clone(),
        );

        let deleted = svc.delete_account().await.unwrap();
        assert_eq!(deleted, 1);
        assert!(backend.profile("user-1").await.is_none());
        assert!(cache.load().await.is_empty());
    }
}
