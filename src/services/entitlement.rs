// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entitlement status derivation.
//!
//! Every gating decision goes through [`evaluate`]. The status is
//! derived, never stored, and must be re-evaluated on every profile
//! reload and on app foreground (a subscription can lapse while the
//! app is backgrounded).

use chrono::{DateTime, Utc};

use crate::models::Profile;

/// Coarse entitlement classification driving feature gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementStatus {
    /// No session.
    Guest,
    /// Authenticated, not subscribed.
    Connected,
    /// Authenticated with `subscription_ends_at` in the future.
    Subscriber,
}

impl EntitlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementStatus::Guest => "guest",
            EntitlementStatus::Connected => "connected",
            EntitlementStatus::Subscriber => "subscriber",
        }
    }
}

/// Derive the entitlement status from a profile snapshot.
///
/// Pure function; `now` is supplied by the caller.
pub fn evaluate(profile: Option<&Profile>, now: DateTime<Utc>) -> EntitlementStatus {
    match profile {
        None => EntitlementStatus::Guest,
        Some(p) if is_subscriber(p.subscription_ends_at, now) => EntitlementStatus::Subscriber,
        Some(_) => EntitlementStatus::Connected,
    }
}

/// Whether a subscription end date grants subscriber status.
///
/// The end date must be strictly greater than `now`; an exactly
/// expired subscription is no longer active.
pub fn is_subscriber(subscription_ends_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    subscription_ends_at.is_some_and(|ends_at| ends_at > now)
}
