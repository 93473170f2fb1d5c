// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credit ledger.
//!
//! Decides whether a generation may proceed and consumes one credit
//! when it does. All mutations run against the authoritative remote
//! state through the store's atomic update path, never a local copy,
//! so concurrent devices cannot double-spend a balance of 1.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::Profile;
use crate::services::entitlement::{self, EntitlementStatus};
use crate::session::{Session, SessionProvider};
use crate::store::traits::{CreditDecision, ProfileStore};

/// Credit accounting against the remote profile store.
#[derive(Clone)]
pub struct CreditLedger {
    sessions: Arc<dyn SessionProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl CreditLedger {
    pub fn new(sessions: Arc<dyn SessionProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { sessions, profiles }
    }

    async fn require_session(&self) -> Result<Session> {
        self.sessions.session().await.ok_or(AppError::AuthRequired)
    }

    /// Check entitlement and consume one credit if required.
    ///
    /// Subscribers succeed unconditionally with no mutation. For
    /// everyone else the store performs the guarded read-decrement;
    /// a zero balance fails with [`AppError::NoCreditsLeft`] and
    /// leaves state unchanged. Must complete before the generation
    /// request is issued (no credit, no generation).
    pub async fn check_and_consume(&self) -> Result<()> {
        let session = self.require_session().await?;
        let profile = self
            .profiles
            .get_profile(&session.access_token, &session.user_id)
            .await?
            .ok_or(AppError::AuthRequired)?;

        if entitlement::evaluate(Some(&profile), Utc::now()) == EntitlementStatus::Subscriber {
            tracing::debug!(user_id = %session.user_id, "Subscriber, no credit consumed");
            return Ok(());
        }

        match self
            .profiles
            .check_and_decrement(&session.access_token, &session.user_id)
            .await?
        {
            CreditDecision::Allowed => {
                tracing::info!(user_id = %session.user_id, "Credit consumed");
                Ok(())
            }
            CreditDecision::Denied => Err(AppError::NoCreditsLeft),
        }
    }

    /// Opportunistic daily recharge, invoked on profile load.
    ///
    /// Idempotent: the grant is guarded by the server-stored
    /// `last_credit_recharge`, so repeated calls within the same 24h
    /// window cannot over-grant.
    pub async fn refresh_recharge(&self) -> Result<Profile> {
        let session = self.require_session().await?;
        let profile = self
            .profiles
            .refresh_recharge(&session.access_token, &session.user_id)
            .await?;
        tracing::debug!(
            user_id = %session.user_id,
            credits = profile.credits_left,
            "Recharge refreshed"
        );
        Ok(profile)
    }

    /// Request a server-side ad-reward credit grant.
    ///
    /// Called only after the reward coordinator confirms the user
    /// earned the reward; the server enforces the daily cap.
    pub async fn grant_reward(&self) -> Result<Profile> {
        let session = self.require_session().await?;
        let profile = self
            .profiles
            .grant_reward(&session.access_token, &session.user_id)
            .await?;
        tracing::info!(
            user_id = %session.user_id,
            credits = profile.credits_left,
            rewarded_today = profile.rewarded_today,
            "Reward credit granted"
        );
        Ok(profile)
    }
}
