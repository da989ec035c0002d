//! Authenticated user identity, supplied by the identity provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
}

/// What the identity provider currently knows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    pub loaded: bool,
    pub user: Option<UserIdentity>,
}

impl IdentitySnapshot {
    /// Loaded and signed in.
    pub fn is_ready(&self) -> bool {
        self.loaded && self.user.is_some()
    }
}

#[async_trait]
pub trait IdentityContext: Send + Sync {
    fn current(&self) -> IdentitySnapshot;

    /// Resolves once the provider reports `loaded`.
    async fn wait_until_loaded(&self) -> IdentitySnapshot;
}

/// Identity state shared through a watch channel.
#[derive(Clone)]
pub struct IdentityHandle {
    tx: watch::Sender<IdentitySnapshot>,
}

impl Default for IdentityHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityHandle {
    /// Starts in the not-loaded state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(IdentitySnapshot::default());
        Self { tx }
    }

    /// Already loaded with the given user (or signed out when `None`).
    pub fn loaded(user_id: Option<String>) -> Self {
        let handle = Self::new();
        handle.set_loaded(user_id);
        handle
    }

    pub fn set_loaded(&self, user_id: Option<String>) {
        self.tx.send_replace(IdentitySnapshot {
            loaded: true,
            user: user_id.map(|id| UserIdentity { id }),
        });
    }

    pub fn reset(&self) {
        self.tx.send_replace(IdentitySnapshot::default());
    }
}

#[async_trait]
impl IdentityContext for IdentityHandle {
    fn current(&self) -> IdentitySnapshot {
        self.tx.borrow().clone()
    }

    async fn wait_until_loaded(&self) -> IdentitySnapshot {
        let mut rx = self.tx.subscribe();
        let snapshot = match rx.wait_for(|snapshot| snapshot.loaded).await {
            Ok(snapshot) => snapshot.clone(),
            // Sender lives in self, so the channel cannot close here.
            Err(_) => self.current(),
        };
        snapshot
    }
}
