//! Which user intent is active on the home view.

use serde::{Deserialize, Serialize};

/// At most one of these is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionState {
    #[default]
    None,
    Instant,
    Join,
    Schedule,
}

impl ActionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Instant => "instant",
            Self::Join => "join",
            Self::Schedule => "schedule",
        }
    }

    /// Whether submitting from this action creates a call.
    pub fn creates_call(&self) -> bool {
        matches!(self, Self::Instant | Self::Schedule)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ActionSelector {
    state: ActionState,
}

impl ActionSelector {
    pub fn current(&self) -> ActionState {
        self.state
    }

    /// Replaces whatever action was active.
    pub fn select(&mut self, action: ActionState) {
        self.state = action;
    }

    pub fn clear(&mut self) {
        self.state = ActionState::None;
    }
}
