//! Drives a [`JoinFlow`] against the identity provider and calling service.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

use super::flow::{JoinFlow, JoinFlowError, JoinPhase, JoinSnapshot};
use crate::calls::{CallHandle, CallId, CallResourceClient};
use crate::identity::IdentityContext;

/// Shared join flow state, readable by API handlers while a resolve runs.
#[derive(Clone)]
pub struct JoinFlowHandle {
    inner: Arc<Mutex<JoinFlow>>,
}

impl JoinFlowHandle {
    pub fn new(target: CallId) -> Self {
        Self {
            inner: Arc::new(Mutex::new(JoinFlow::new(target))),
        }
    }

    pub async fn snapshot(&self) -> JoinSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn phase(&self) -> JoinPhase {
        self.inner.lock().await.phase()
    }

    pub async fn navigate(&self, target: CallId) -> bool {
        self.inner.lock().await.navigate(target)
    }

    pub async fn reload(&self) {
        self.inner.lock().await.reload();
    }

    pub async fn confirm_setup(&self) -> Result<CallHandle, JoinFlowError> {
        self.inner.lock().await.confirm_setup().cloned()
    }

    async fn with_flow<T>(&self, f: impl FnOnce(&mut JoinFlow) -> T) -> T {
        let mut flow = self.inner.lock().await;
        f(&mut flow)
    }
}

/// Local device check shown before entering the room.
#[async_trait]
pub trait DeviceSetup: Send + Sync {
    /// `Ok(true)` when the user confirmed their devices.
    async fn confirm(&self, call: Option<&CallHandle>) -> Result<bool>;
}

/// Live room surface; receives the resolved call as an opaque capability.
#[async_trait]
pub trait RoomRenderer: Send + Sync {
    async fn enter(&self, call: CallHandle) -> Result<()>;
}

pub struct JoinFlowController {
    client: Arc<dyn CallResourceClient>,
    identity: Arc<dyn IdentityContext>,
    resolve_timeout: Option<Duration>,
}

impl JoinFlowController {
    pub fn new(
        client: Arc<dyn CallResourceClient>,
        identity: Arc<dyn IdentityContext>,
        resolve_timeout: Option<Duration>,
    ) -> Self {
        Self {
            client,
            identity,
            resolve_timeout,
        }
    }

    /// Waits for identity and the call fetch, applying each as it lands.
    ///
    /// On timeout the flow stays in Resolving; re-navigating retries.
    pub async fn resolve(&self, flow: &JoinFlowHandle) -> Result<JoinPhase, JoinFlowError> {
        let ticket = flow.with_flow(|f| f.ticket()).await;

        let identity = async {
            self.identity.wait_until_loaded().await;
            flow.with_flow(|f| f.identity_loaded(&ticket)).await;
        };
        let fetch = async {
            let result = self
                .client
                .get_by_id(&ticket.target)
                .await
                .map_err(|e| format!("{:#}", e));
            flow.with_flow(|f| f.call_fetched(&ticket, result)).await;
        };
        let both = async {
            tokio::join!(identity, fetch);
        };

        match self.resolve_timeout {
            Some(limit) => {
                if tokio::time::timeout(limit, both).await.is_err() {
                    flow.with_flow(|f| f.resolve_timed_out(&ticket, limit)).await;
                    return Err(JoinFlowError::ResolveTimeout(ticket.target.clone(), limit));
                }
            }
            None => both.await,
        }

        Ok(flow.phase().await)
    }

    /// Resolve → device setup → room.
    ///
    /// Returns `Ok(false)` when the user backed out of setup.
    pub async fn run(
        &self,
        flow: &JoinFlowHandle,
        setup: &dyn DeviceSetup,
        room: &dyn RoomRenderer,
    ) -> Result<bool> {
        self.resolve(flow).await?;
        self.enter(flow, setup, room).await
    }

    /// Device setup → room, for a flow that has finished resolving.
    pub async fn enter(
        &self,
        flow: &JoinFlowHandle,
        setup: &dyn DeviceSetup,
        room: &dyn RoomRenderer,
    ) -> Result<bool> {
        let snapshot = flow.snapshot().await;
        if snapshot.phase != JoinPhase::AwaitingSetup {
            return Err(JoinFlowError::NotAwaitingSetup(snapshot.phase.as_str()).into());
        }
        if !setup.confirm(snapshot.call.as_ref()).await? {
            info!("Device setup for call {} cancelled", snapshot.target);
            return Ok(false);
        }

        let call = flow.confirm_setup().await?;
        room.enter(call).await?;
        Ok(true)
    }
}
