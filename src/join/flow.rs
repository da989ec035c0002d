//! Join flow state machine: Resolving → AwaitingSetup → InRoom.
//!
//! Resolving waits for two independent completions, identity loaded and
//! call fetched, in either order. Setup confirmation is the only way into
//! the room, and only a fresh navigation leaves it.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calls::{CallHandle, CallId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPhase {
    Resolving,
    AwaitingSetup,
    InRoom,
}

impl JoinPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::AwaitingSetup => "awaiting_setup",
            Self::InRoom => "in_room",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinFlowError {
    #[error("timed out after {1:?} resolving call {0}")]
    ResolveTimeout(CallId, Duration),
    #[error("call {0} was not found")]
    CallNotFound(CallId),
    #[error("setup cannot be confirmed while {0}")]
    NotAwaitingSetup(&'static str),
}

/// Identifies one Resolving entry; events for an older entry are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveTicket {
    pub target: CallId,
    epoch: u64,
}

#[derive(Debug, Clone)]
enum Fetch {
    Pending,
    Done(Option<CallHandle>),
}

#[derive(Debug, Clone)]
pub struct JoinFlow {
    target: CallId,
    epoch: u64,
    identity_loaded: bool,
    fetch: Fetch,
    setup_complete: bool,
    phase: JoinPhase,
    last_error: Option<String>,
    timed_out: Option<Duration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinSnapshot {
    pub target: CallId,
    pub phase: JoinPhase,
    pub setup_complete: bool,
    pub call: Option<CallHandle>,
    pub last_error: Option<String>,
    pub timed_out: bool,
}

impl JoinFlow {
    /// Entry via navigation to `/meeting/<target>`.
    pub fn new(target: CallId) -> Self {
        info!("Join flow resolving call {}", target);
        Self {
            target,
            epoch: 0,
            identity_loaded: false,
            fetch: Fetch::Pending,
            setup_complete: false,
            phase: JoinPhase::Resolving,
            last_error: None,
            timed_out: None,
        }
    }

    pub fn phase(&self) -> JoinPhase {
        self.phase
    }

    pub fn target(&self) -> &CallId {
        &self.target
    }

    pub fn setup_complete(&self) -> bool {
        self.setup_complete
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn ticket(&self) -> ResolveTicket {
        ResolveTicket {
            target: self.target.clone(),
            epoch: self.epoch,
        }
    }

    /// The resolved call. Nothing is authoritative while still resolving.
    pub fn call(&self) -> Option<&CallHandle> {
        match (&self.phase, &self.fetch) {
            (JoinPhase::Resolving, _) | (_, Fetch::Pending) => None,
            (_, Fetch::Done(call)) => call.as_ref(),
        }
    }

    /// The capability handed to the room renderer.
    pub fn room_call(&self) -> Option<&CallHandle> {
        match self.phase {
            JoinPhase::InRoom => self.call(),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> JoinSnapshot {
        JoinSnapshot {
            target: self.target.clone(),
            phase: self.phase,
            setup_complete: self.setup_complete,
            call: self.call().cloned(),
            last_error: self.last_error.clone(),
            timed_out: self.timed_out.is_some(),
        }
    }

    /// Follows a route change. Restarts only when the target differs.
    pub fn navigate(&mut self, target: CallId) -> bool {
        if target == self.target {
            return false;
        }
        self.target = target;
        self.restart();
        true
    }

    /// Fresh navigation to the same route.
    pub fn reload(&mut self) {
        self.restart();
    }

    fn restart(&mut self) {
        self.epoch += 1;
        self.identity_loaded = false;
        self.fetch = Fetch::Pending;
        self.setup_complete = false;
        self.phase = JoinPhase::Resolving;
        self.last_error = None;
        self.timed_out = None;
        info!("Join flow resolving call {}", self.target);
    }

    fn is_current(&self, ticket: &ResolveTicket) -> bool {
        let current = ticket.epoch == self.epoch && ticket.target == self.target;
        if !current {
            debug!(
                "Dropping stale join event for {} (epoch {})",
                ticket.target, ticket.epoch
            );
        }
        current
    }

    pub fn identity_loaded(&mut self, ticket: &ResolveTicket) {
        if !self.is_current(ticket) {
            return;
        }
        self.identity_loaded = true;
        self.advance();
    }

    /// Records the get-by-id outcome. A failure counts as completion with no call.
    pub fn call_fetched(&mut self, ticket: &ResolveTicket, result: Result<Option<CallHandle>, String>) {
        if !self.is_current(ticket) || !matches!(self.fetch, Fetch::Pending) {
            return;
        }
        let call = match result {
            Ok(call) => call,
            Err(e) => {
                warn!("Fetching call {} failed: {}", self.target, e);
                self.last_error = Some(e);
                None
            }
        };
        if call.is_none() {
            debug!("Call {} resolved to nothing", self.target);
        }
        self.fetch = Fetch::Done(call);
        self.advance();
    }

    /// Gives up waiting on this entry. The flow stays in Resolving until the
    /// route is reloaded or left; late completions are still applied.
    pub fn resolve_timed_out(&mut self, ticket: &ResolveTicket, limit: Duration) {
        if !self.is_current(ticket) || self.phase != JoinPhase::Resolving {
            return;
        }
        warn!("Resolving call {} timed out after {:?}", self.target, limit);
        self.timed_out = Some(limit);
        let error = JoinFlowError::ResolveTimeout(self.target.clone(), limit);
        self.last_error = Some(error.to_string());
    }

    fn advance(&mut self) {
        if self.phase == JoinPhase::Resolving
            && self.identity_loaded
            && matches!(self.fetch, Fetch::Done(_))
        {
            self.phase = JoinPhase::AwaitingSetup;
            if self.timed_out.take().is_some() {
                self.last_error = None;
            }
            info!("Call {} resolved, awaiting device setup", self.target);
        }
    }

    /// The user's device-setup confirmation. Moves into the room exactly once.
    pub fn confirm_setup(&mut self) -> Result<&CallHandle, JoinFlowError> {
        if let (JoinPhase::Resolving, Some(limit)) = (self.phase, self.timed_out) {
            return Err(JoinFlowError::ResolveTimeout(self.target.clone(), limit));
        }
        if self.phase != JoinPhase::AwaitingSetup {
            return Err(JoinFlowError::NotAwaitingSetup(self.phase.as_str()));
        }
        if !matches!(self.fetch, Fetch::Done(Some(_))) {
            return Err(JoinFlowError::CallNotFound(self.target.clone()));
        }

        self.setup_complete = true;
        self.phase = JoinPhase::InRoom;
        info!("Setup complete, entering call {}", self.target);

        self.room_call()
            .ok_or_else(|| JoinFlowError::CallNotFound(self.target.clone()))
    }
}
