//! User profile model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum ad-reward credits per day, enforced server-side.
pub const DAILY_REWARD_CAP: u32 = 5;

/// User profile stored in the remote backend.
///
/// `credits_left`, `last_credit_recharge` and `rewarded_today` are
/// only ever mutated through the store's atomic update path; this
/// struct is a read snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Opaque stable user identifier (owning key for all records)
    pub user_id: String,
    /// End of the current subscription period; absent means never
    /// subscribed or lapsed
    #[serde(default)]
    pub subscription_ends_at: Option<DateTime<Utc>>,
    /// Remaining plumette balance (non-subscribers only)
    #[serde(default)]
    pub credits_left: u32,
    /// Timestamp of the last automatic credit grant; anchors the 24h
    /// recharge cycle
    #[serde(default)]
    pub last_credit_recharge: Option<DateTime<Utc>>,
    /// Ad-granted credits already consumed today
    #[serde(default)]
    pub rewarded_today: u32,
    /// Adult first names used for personalization
    #[serde(default)]
    pub first_names: Vec<String>,
    /// Children names used for personalization
    #[serde(default)]
    pub children_names: Vec<String>,
    /// Selected avatar asset name
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// When the profile was created (ISO 8601)
    #[serde(default)]
    pub created_at: String,
}

impl Profile {
    /// Fresh profile for a newly authenticated user.
    pub fn new(user_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            subscription_ends_at: None,
            credits_left: 1,
            last_credit_recharge: Some(created_at),
            rewarded_today: 0,
            first_names: Vec::new(),
            children_names: Vec::new(),
            avatar_url: None,
            created_at: crate::time_utils::format_utc_rfc3339(created_at),
        }
    }
}

/// Personalization fields a user may edit.
///
/// Entitlement fields (`subscription_ends_at`, credits, recharge
/// timestamps) are deliberately absent; those only move through the
/// ledger and purchase confirmation paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Avatars available for selection in the profile editor.
pub const AVATAR_OPTIONS: &[&str] = &[
    "avatar1.png",
    "avatar2.png",
    "avatar3.png",
    "avatar4.png",
    "avatar5.png",
];
