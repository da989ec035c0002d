//! User-entered meeting fields, held until a call is created.
//!
//! Writes are never validated here so half-filled forms stay editable;
//! the creation orchestrator checks the draft at submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingDraft {
    pub start_time: Option<DateTime<Utc>>,
    pub description: String,
    pub join_link: String,
}

impl Default for MeetingDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// One editable field and its new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum DraftField {
    StartTime(Option<DateTime<Utc>>),
    Description(String),
    JoinLink(String),
}

impl MeetingDraft {
    /// A fresh draft starts "now".
    pub fn new() -> Self {
        Self {
            start_time: Some(Utc::now()),
            description: String::new(),
            join_link: String::new(),
        }
    }

    pub fn update(&mut self, field: DraftField) {
        match field {
            DraftField::StartTime(value) => self.start_time = value,
            DraftField::Description(value) => self.description = value,
            DraftField::JoinLink(value) => self.join_link = value,
        }
    }

    /// Empty description means the call is joined right away.
    pub fn is_instant(&self) -> bool {
        self.description.is_empty()
    }
}
