// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session seam over the external authentication provider.
//!
//! The core only ever reads session presence and the bearer token used
//! to authorize remote calls; sign-in/out flows stay in the embedding
//! app.

use std::sync::Arc;

use async_trait::async_trait;

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque stable user identifier
    pub user_id: String,
    /// Bearer token for backend calls
    pub access_token: String,
}

/// Capability trait for the auth provider.
///
/// Implementations must be thread-safe (`Send + Sync`) as they are
/// read concurrently from every service.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session, or `None` when signed out.
    async fn session(&self) -> Option<Session>;
}

#[async_trait]
impl<S: SessionProvider + ?Sized> SessionProvider for Arc<S> {
    async fn session(&self) -> Option<Session> {
        (**self).session().await
    }
}

/// In-memory session holder, for tests and for hosts that push auth
/// state changes into the core.
#[derive(Default)]
pub struct StaticSessionProvider {
    current: tokio::sync::RwLock<Option<Session>>,
}

impl StaticSessionProvider {
    /// Start signed out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an active session.
    pub fn signed_in(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            current: tokio::sync::RwLock::new(Some(Session {
                user_id: user_id.into(),
                access_token: access_token.into(),
            })),
        }
    }

    /// Replace the current session (auth state change callback).
    pub async fn set_session(&self, session: Option<Session>) {
        *self.current.write().await = session;
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn session(&self) -> Option<Session> {
        self.current.read().await.clone()
    }
}
