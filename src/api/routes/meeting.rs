//! Meeting route endpoints.
//!
//! Provides HTTP endpoints for:
//! - Opening a meeting route and reading its join state (GET /meeting/:id)
//! - Confirming device setup to enter the room (POST /meeting/:id/setup)
//! - Leaving the meeting route (DELETE /meeting)
//!
//! The service drives a single meeting route. Opening a different id
//! navigates the current join flow; opening the same id again reads its
//! state unless `?reload=true` is given.

use crate::api::error::{ApiError, ApiResult};
use crate::calls::CallId;
use crate::join::{JoinFlowController, JoinFlowHandle, JoinSnapshot};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Clone)]
pub struct MeetingState {
    pub controller: Arc<JoinFlowController>,
    route: Arc<Mutex<Option<JoinFlowHandle>>>,
}

impl MeetingState {
    pub fn new(controller: Arc<JoinFlowController>) -> Self {
        Self {
            controller,
            route: Arc::new(Mutex::new(None)),
        }
    }

    /// Opens the route, starting a resolve when this is a fresh navigation.
    async fn open(&self, id: CallId, reload: bool) -> JoinFlowHandle {
        let mut route = self.route.lock().await;
        let (flow, fresh) = match route.as_ref() {
            Some(current) => {
                let flow = current.clone();
                let fresh = if reload {
                    flow.reload().await;
                    true
                } else {
                    flow.navigate(id).await
                };
                (flow, fresh)
            }
            None => {
                let flow = JoinFlowHandle::new(id);
                *route = Some(flow.clone());
                (flow, true)
            }
        };
        drop(route);

        if fresh {
            let controller = Arc::clone(&self.controller);
            let resolving = flow.clone();
            tokio::spawn(async move {
                // Timeouts are recorded on the flow and surface in its snapshot.
                if let Err(e) = controller.resolve(&resolving).await {
                    debug!("Join flow did not resolve: {}", e);
                }
            });
        }

        flow
    }

    /// The flow for `id`, if that is the route currently open.
    async fn current(&self, id: &CallId) -> Option<JoinFlowHandle> {
        let flow = self.route.lock().await.clone()?;
        if flow.snapshot().await.target == *id {
            Some(flow)
        } else {
            None
        }
    }

    async fn leave(&self) -> Option<CallId> {
        let flow = self.route.lock().await.take()?;
        Some(flow.snapshot().await.target)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenQuery {
    #[serde(default)]
    pub reload: bool,
}

pub fn router(state: MeetingState) -> Router {
    Router::new()
        .route("/meeting", delete(leave_meeting))
        .route("/meeting/:id", get(open_meeting))
        .route("/meeting/:id/setup", post(confirm_setup))
        .with_state(state)
}

fn parse_id(raw: &str) -> ApiResult<CallId> {
    CallId::parse(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// GET /meeting/:id - Join state; `resolving` means show the loader.
async fn open_meeting(
    Path(raw_id): Path<String>,
    Query(query): Query<OpenQuery>,
    State(state): State<MeetingState>,
) -> ApiResult<Json<JoinSnapshot>> {
    let id = parse_id(&raw_id)?;
    let flow = state.open(id, query.reload).await;
    Ok(Json(flow.snapshot().await))
}

/// POST /meeting/:id/setup - Device setup confirmed; enter the room.
async fn confirm_setup(
    Path(raw_id): Path<String>,
    State(state): State<MeetingState>,
) -> ApiResult<Json<JoinSnapshot>> {
    let id = parse_id(&raw_id)?;
    let flow = state
        .current(&id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Meeting {} is not open", id)))?;

    let call = flow.confirm_setup().await?;
    info!("Entering room for call {}", call.id);

    Ok(Json(flow.snapshot().await))
}

/// DELETE /meeting - Leave the meeting route.
async fn leave_meeting(State(state): State<MeetingState>) -> Json<Value> {
    let left = state.leave().await;
    if let Some(id) = &left {
        info!("Left meeting route {}", id);
    }
    Json(json!({ "left": left }))
}
