// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod entitlement;
pub mod generation;
pub mod history;
pub mod ledger;
pub mod profile;
pub mod recharge;
pub mod reward;

pub use entitlement::EntitlementStatus;
pub use generation::{GenerateStoryRequest, StoryGenerator};
pub use history::HistoryService;
pub use ledger::CreditLedger;
pub use profile::{ProfileService, ProfileSnapshot};
pub use recharge::Countdown;
pub use reward::{AttemptState, RewardAttempt, RewardGrantCoordinator, RewardOutcome};
