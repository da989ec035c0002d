//! In-process call store used when no calling service is configured.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;

use super::{CallHandle, CallId, CallParams, CallResourceClient};

#[derive(Default)]
pub struct MemoryCallClient {
    calls: Mutex<HashMap<CallId, CallHandle>>,
    created_by: Option<String>,
}

impl MemoryCallClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_creator(mut self, user_id: impl Into<String>) -> Self {
        self.created_by = Some(user_id.into());
        self
    }

    pub async fn len(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.calls.lock().await.is_empty()
    }
}

#[async_trait]
impl CallResourceClient for MemoryCallClient {
    async fn create_or_get(&self, id: &CallId, params: &CallParams) -> Result<CallHandle> {
        let mut calls = self.calls.lock().await;
        if let Some(existing) = calls.get(id) {
            return Ok(existing.clone());
        }

        let handle = CallHandle {
            id: id.clone(),
            starts_at: Some(params.starts_at),
            description: params.description.clone(),
            loading: false,
            created_by: self.created_by.clone(),
        };
        calls.insert(id.clone(), handle.clone());
        info!("Created in-memory call {}", id);
        Ok(handle)
    }

    async fn get_by_id(&self, id: &CallId) -> Result<Option<CallHandle>> {
        Ok(self.calls.lock().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn params(description: &str) -> CallParams {
        CallParams::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            description,
        )
    }

    #[tokio::test]
    async fn test_create_or_get_is_idempotent() {
        let client = MemoryCallClient::new();
        let id = CallId::parse("abc").unwrap();

        let first = client.create_or_get(&id, &params("Team sync")).await.unwrap();
        let second = client.create_or_get(&id, &params("Other")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.description, "Team sync");
        assert_eq!(client.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_call_is_none() {
        let client = MemoryCallClient::new();
        let id = CallId::parse("missing").unwrap();
        assert!(client.get_by_id(&id).await.unwrap().is_none());
        assert!(client.is_empty().await);
    }

    #[tokio::test]
    async fn test_creator_is_recorded() {
        let client = MemoryCallClient::new().with_creator("user_1");
        let id = CallId::parse("abc").unwrap();
        client.create_or_get(&id, &params("")).await.unwrap();

        let fetched = client.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(fetched.created_by.as_deref(), Some("user_1"));
        assert_eq!(fetched.description, "Instant Meeting");
    }
}
