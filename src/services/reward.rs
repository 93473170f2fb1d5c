// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reward-ad grant coordinator.
//!
//! Drives one reward-ad attempt as an explicit state machine:
//!
//! `Idle -> Requested -> (Loaded -> Shown -> {Rewarded|NotRewarded})
//!                     | LoadFailed -> Closed`
//!
//! The ad provider SDK delivers callbacks; the embedding UI forwards
//! them into a [`RewardAttempt`] and awaits the matching
//! [`RewardOutcome`]. Each attempt resolves exactly once: duplicate
//! provider callbacks are ignored, load failures resolve `false`
//! after a bounded fallback delay, and dropping the attempt handle
//! resolves `false`. The reward flag is only ever set by an explicit
//! reward-earned signal, never inferred from the ad closing.
//!
//! The coordinator never touches credits itself; on a `true` outcome
//! the caller requests the server-side grant, which enforces the
//! daily cap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

/// State of a single reward-ad attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    /// Creative requested from the ad provider.
    Requested,
    /// Creative ready; waiting for user confirmation unless intent
    /// was already given.
    Loaded,
    /// Ad on screen.
    Shown,
    /// Provider signalled reward earned.
    Rewarded,
    /// Ad fully closed without a reward signal.
    NotRewarded,
    /// Provider failed to deliver a creative.
    LoadFailed,
    Closed,
}

struct AttemptInner {
    state: Mutex<AttemptState>,
    resolver: Mutex<Option<oneshot::Sender<bool>>>,
    intent: AtomicBool,
    rewarded: AtomicBool,
    fallback: Duration,
}

impl AttemptInner {
    fn transition(&self, to: AttemptState) {
        let mut state = self.state.lock().expect("attempt state poisoned");
        tracing::debug!(from = ?*state, ?to, "Reward attempt transition");
        *state = to;
    }

    /// Resolve the pending outcome exactly once.
    fn resolve(&self, rewarded: bool) {
        let sender = self.resolver.lock().expect("attempt resolver poisoned").take();
        match sender {
            Some(tx) => {
                // The receiver may have been dropped by a navigating
                // caller; the result is then discarded, not applied.
                let _ = tx.send(rewarded);
                tracing::debug!(rewarded, "Reward attempt resolved");
            }
            None => tracing::debug!("Duplicate reward resolution ignored"),
        }
    }
}

/// Handle for forwarding ad-provider events into one attempt.
///
/// Clone freely; all clones refer to the same attempt.
#[derive(Clone)]
pub struct RewardAttempt {
    inner: Arc<AttemptInner>,
}

impl RewardAttempt {
    pub fn state(&self) -> AttemptState {
        *self.inner.state.lock().expect("attempt state poisoned")
    }

    /// The user confirmed they want to watch the ad.
    ///
    /// Returns `true` when the creative is already loaded and the
    /// caller should show it now; otherwise the show happens on
    /// `on_loaded`.
    pub fn confirm_intent(&self) -> bool {
        self.inner.intent.store(true, Ordering::SeqCst);
        if self.state() == AttemptState::Loaded {
            self.inner.transition(AttemptState::Shown);
            return true;
        }
        false
    }

    /// The user declined to watch.
    pub fn decline(&self) {
        self.inner.transition(AttemptState::Closed);
        self.inner.resolve(false);
    }

    /// Provider callback: creative loaded.
    ///
    /// Returns `true` when the caller should show the ad immediately
    /// (intent already confirmed). Unrequested ads are never
    /// auto-shown.
    pub fn on_loaded(&self) -> bool {
        if self.state() != AttemptState::Requested {
            return false;
        }
        self.inner.transition(AttemptState::Loaded);
        if self.inner.intent.load(Ordering::SeqCst) {
            self.inner.transition(AttemptState::Shown);
            return true;
        }
        false
    }

    /// Provider callback: reward earned.
    ///
    /// This is the only path that marks the attempt rewarded.
    pub fn on_reward_earned(&self) {
        self.inner.rewarded.store(true, Ordering::SeqCst);
        if self.state() == AttemptState::Shown {
            self.inner.transition(AttemptState::Rewarded);
        }
    }

    /// Provider callback: ad closed.
    pub fn on_closed(&self) {
        let rewarded = self.inner.rewarded.load(Ordering::SeqCst);
        if self.state() == AttemptState::Shown && !rewarded {
            self.inner.transition(AttemptState::NotRewarded);
        }
        self.inner.transition(AttemptState::Closed);
        self.inner.resolve(rewarded);
    }

    /// Provider callback: load or show error.
    ///
    /// The outcome still resolves deterministically (`false`) after
    /// the bounded fallback delay, so callers never hang on an ad.
    pub fn on_load_failed(&self) {
        self.inner.transition(AttemptState::LoadFailed);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.fallback).await;
            inner.transition(AttemptState::Closed);
            inner.resolve(false);
        });
    }
}

/// Pending outcome of one reward-ad attempt.
pub struct RewardOutcome {
    rx: oneshot::Receiver<bool>,
}

impl RewardOutcome {
    /// Wait for the attempt to resolve.
    ///
    /// Returns `false` when the attempt handle was dropped without a
    /// resolution (leaked provider listeners must not hang callers).
    pub async fn rewarded(self) -> bool {
        self.rx.await.unwrap_or(false)
    }
}

/// Factory for reward-ad attempts.
#[derive(Debug, Clone)]
pub struct RewardGrantCoordinator {
    fallback: Duration,
}

impl RewardGrantCoordinator {
    pub fn new(fallback: Duration) -> Self {
        Self { fallback }
    }

    /// Start a new attempt; the creative request goes out to the
    /// provider as a side effect in the caller.
    pub fn begin(&self) -> (RewardAttempt, RewardOutcome) {
        let (tx, rx) = oneshot::channel();
        let inner = Arc::new(AttemptInner {
            state: Mutex::new(AttemptState::Idle),
            resolver: Mutex::new(Some(tx)),
            intent: AtomicBool::new(false),
            rewarded: AtomicBool::new(false),
            fallback: self.fallback,
        });
        inner.transition(AttemptState::Requested);
        (RewardAttempt { inner }, RewardOutcome { rx })
    }
}
