//! Navigation intents and user-facing notices emitted by the session core.
//!
//! The core never routes or renders on its own; it hands these signals to a
//! [`Navigator`] and a [`Notifier`] supplied by the presentation layer.

use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::calls::CallId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "target", rename_all = "lowercase")]
pub enum Route {
    Home,
    Meeting(CallId),
    Recordings,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Meeting(id) => format!("/meeting/{}", id),
            Self::Recordings => "/recordings".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Notice {
    MeetingCreated,
    MissingDateTime,
    CreationFailed(String),
    LinkCopied,
    InvalidJoinLink(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::MeetingCreated => "Meeting Created".to_string(),
            Self::MissingDateTime => "Please select a date and time".to_string(),
            Self::CreationFailed(_) => "Failed to create meeting".to_string(),
            Self::LinkCopied => "Link Copied".to_string(),
            Self::InvalidJoinLink(_) => "Invalid meeting link".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::MissingDateTime | Self::CreationFailed(_) | Self::InvalidJoinLink(_)
        )
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl Navigator for mpsc::UnboundedSender<Route> {
    fn navigate(&self, route: Route) {
        if self.send(route).is_err() {
            warn!("Navigation dropped: no listener");
        }
    }
}

impl Notifier for mpsc::UnboundedSender<Notice> {
    fn notify(&self, notice: Notice) {
        if self.send(notice).is_err() {
            warn!("Notice dropped: no listener");
        }
    }
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_error() {
            warn!("{} ({:?})", notice.message(), notice);
        } else {
            info!("{}", notice.message());
        }
    }
}
