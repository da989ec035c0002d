//! HTTP client for the calling service's call endpoints.
//!
//! `POST {api_url}/call/{type}/{id}` creates-or-gets a call and
//! `GET {api_url}/call/{type}/{id}` fetches one.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{CallHandle, CallId, CallIdError, CallParams, CallResourceClient};
use crate::config::CallsConfig;

pub struct HttpCallClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    token: Option<String>,
    call_type: String,
}

#[derive(Debug, Serialize)]
struct GetOrCreateRequest {
    data: CallRequestData,
}

#[derive(Debug, Serialize)]
struct CallRequestData {
    starts_at: String,
    custom: CustomData,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct CustomData {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallResponse {
    call: RemoteCall,
}

#[derive(Debug, Deserialize)]
struct RemoteCall {
    id: String,
    starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    custom: CustomData,
    created_by: Option<RemoteUser>,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: String,
}

impl TryFrom<RemoteCall> for CallHandle {
    type Error = CallIdError;

    fn try_from(call: RemoteCall) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CallId::parse(&call.id)?,
            starts_at: call.starts_at,
            description: call.custom.description.unwrap_or_default(),
            loading: false,
            created_by: call.created_by.map(|user| user.id),
        })
    }
}

impl HttpCallClient {
    pub fn from_config(config: &CallsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(1)))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            token: config.token.clone(),
            call_type: config.call_type.clone(),
        })
    }

    fn call_url(&self, id: &CallId) -> String {
        format!("{}/call/{}/{}", self.api_url, self.call_type, id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = match &self.api_key {
            Some(key) => request.query(&[("api_key", key)]),
            None => request,
        };
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl CallResourceClient for HttpCallClient {
    async fn create_or_get(&self, id: &CallId, params: &CallParams) -> Result<CallHandle> {
        let body = GetOrCreateRequest {
            data: CallRequestData {
                starts_at: params
                    .starts_at
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                custom: CustomData {
                    description: Some(params.description.clone()),
                },
            },
        };

        debug!("POST {}", self.call_url(id));
        let response = self
            .authorize(self.client.post(self.call_url(id)))
            .json(&body)
            .send()
            .await
            .context("Failed to reach calling service")?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "Call creation failed ({}): {}",
                status,
                text
            ));
        }

        let parsed: CallResponse =
            serde_json::from_str(&text).context("Failed to parse call response")?;

        CallHandle::try_from(parsed.call).context("Calling service returned an invalid call id")
    }

    async fn get_by_id(&self, id: &CallId) -> Result<Option<CallHandle>> {
        debug!("GET {}", self.call_url(id));
        let response = self
            .authorize(self.client.get(self.call_url(id)))
            .send()
            .await
            .context("Failed to reach calling service")?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let text = response.text().await?;

        if !status.is_success() {
            return Err(anyhow::anyhow!("Failed to get call ({}): {}", status, text));
        }

        let parsed: CallResponse =
            serde_json::from_str(&text).context("Failed to parse call response")?;

        let handle = CallHandle::try_from(parsed.call)
            .context("Calling service returned an invalid call id")?;
        Ok(Some(handle))
    }
}
