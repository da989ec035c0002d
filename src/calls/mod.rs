//! Call resources hosted by the external calling service.
//!
//! The session logic only sees the [`CallResourceClient`] trait; concrete
//! clients talk to the service over HTTP or keep calls in memory.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod http_client;
pub mod memory;

pub use http_client::HttpCallClient;
pub use memory::MemoryCallClient;

use crate::config::CallsConfig;

/// Description stored on calls created without one.
pub const INSTANT_MEETING_DESCRIPTION: &str = "Instant Meeting";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallIdError {
    #[error("call id is empty")]
    Empty,
    #[error("call id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Unique token addressing one call resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    /// Validates an id that came from user input or a route segment.
    pub fn parse(raw: &str) -> Result<Self, CallIdError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CallIdError::Empty);
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace())
        {
            return Err(CallIdError::InvalidCharacter(bad));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh call ids.
pub trait CallIdGenerator: Send + Sync {
    fn generate(&self) -> CallId;
}

/// Random v4 UUIDs; collisions are negligible.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl CallIdGenerator for UuidGenerator {
    fn generate(&self) -> CallId {
        CallId(uuid::Uuid::new_v4().to_string())
    }
}

/// Parameters sent with a create-or-get request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallParams {
    pub starts_at: DateTime<Utc>,
    pub description: String,
}

impl CallParams {
    /// Normalizes the start time and substitutes the instant-meeting description.
    pub fn new(starts_at: DateTime<Utc>, description: &str) -> Self {
        let description = if description.is_empty() {
            INSTANT_MEETING_DESCRIPTION.to_string()
        } else {
            description.to_string()
        };

        Self {
            starts_at: normalize_start(starts_at),
            description,
        }
    }
}

/// Truncates to millisecond precision, matching the service's ISO-8601 form.
pub fn normalize_start(starts_at: DateTime<Utc>) -> DateTime<Utc> {
    starts_at
        .duration_trunc(TimeDelta::milliseconds(1))
        .unwrap_or(starts_at)
}

/// A call resource as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallHandle {
    pub id: CallId,
    pub starts_at: Option<DateTime<Utc>>,
    pub description: String,
    pub loading: bool,
    pub created_by: Option<String>,
}

/// Remote calling service operations consumed by the session core.
#[async_trait]
pub trait CallResourceClient: Send + Sync {
    /// Creates the call, or returns the existing one when `id` is taken.
    async fn create_or_get(&self, id: &CallId, params: &CallParams) -> Result<CallHandle>;

    /// Fetches a call; `Ok(None)` when the service does not know the id.
    async fn get_by_id(&self, id: &CallId) -> Result<Option<CallHandle>>;
}

/// Picks the HTTP client when an endpoint is configured, memory otherwise.
///
/// The in-memory store records `user_id` as the creator of its calls; the
/// remote service derives it from the request credentials.
pub fn build_client(
    config: &CallsConfig,
    user_id: Option<&str>,
) -> Result<Arc<dyn CallResourceClient>> {
    if config.api_url.trim().is_empty() {
        tracing::warn!("No calling service endpoint configured, using in-memory calls");
        let client = match user_id {
            Some(user_id) => MemoryCallClient::new().with_creator(user_id),
            None => MemoryCallClient::new(),
        };
        return Ok(Arc::new(client));
    }
    Ok(Arc::new(HttpCallClient::from_config(config)?))
}
