//! Home session endpoints.
//!
//! Provides HTTP endpoints for:
//! - Reading the session and panel state (GET /session)
//! - Selecting or clearing an action (POST /session/action, POST /session/clear)
//! - Editing the draft (PATCH /session/draft)
//! - Creating a call (POST /session/submit)
//! - Joining by link (POST /session/join)
//! - Opening recordings (POST /session/recordings)
//! - Reading or copying the meeting link (GET /session/link, POST /session/link/copy)

use crate::api::error::{ApiError, ApiResult};
use crate::clipboard::{self, SharedClipboard, SystemClipboard, TextClipboard};
use crate::session::{ActionState, DraftField, HomeSession, HomeSnapshot, Route};
use axum::{
    extract::State,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct SessionState {
    pub home: Arc<HomeSession>,
    clipboard: SharedClipboard,
}

impl SessionState {
    /// Session state backed by the desktop clipboard, held open for the
    /// lifetime of the service so copied links stay available.
    pub fn new(home: Arc<HomeSession>) -> Self {
        Self::with_clipboard(home, clipboard::shared(SystemClipboard::new()))
    }

    pub fn with_clipboard(home: Arc<HomeSession>, clipboard: SharedClipboard) -> Self {
        Self { home, clipboard }
    }
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: ActionState,
}

pub fn router(state: SessionState) -> Router {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/action", post(select_action))
        .route("/session/clear", post(clear_session))
        .route("/session/draft", patch(update_draft))
        .route("/session/submit", post(submit))
        .route("/session/join", post(join))
        .route("/session/recordings", post(view_recordings))
        .route("/session/link", get(get_link))
        .route("/session/link/copy", post(copy_link))
        .with_state(state)
}

async fn get_session(State(state): State<SessionState>) -> Json<HomeSnapshot> {
    Json(state.home.snapshot().await)
}

async fn select_action(
    State(state): State<SessionState>,
    Json(req): Json<ActionRequest>,
) -> Json<HomeSnapshot> {
    state.home.select(req.action).await;
    Json(state.home.snapshot().await)
}

async fn clear_session(State(state): State<SessionState>) -> Json<HomeSnapshot> {
    state.home.clear().await;
    Json(state.home.snapshot().await)
}

async fn update_draft(
    State(state): State<SessionState>,
    Json(field): Json<DraftField>,
) -> Json<HomeSnapshot> {
    state.home.update_draft(field).await;
    Json(state.home.snapshot().await)
}

/// POST /session/submit - Create a call from the draft.
///
/// `created: false` means the submission was ignored (no creating panel,
/// identity not ready, or another submission in flight).
async fn submit(State(state): State<SessionState>) -> ApiResult<Json<Value>> {
    info!("Meeting submit received via API");

    let created = state.home.submit().await?;
    let session = state.home.snapshot().await;

    Ok(Json(match created {
        Some(created) => json!({
            "created": true,
            "call": created.handle,
            "navigate_to": created.navigation.map(|route| route.path()),
            "session": session,
        }),
        None => json!({
            "created": false,
            "session": session,
        }),
    }))
}

async fn join(State(state): State<SessionState>) -> ApiResult<Json<Value>> {
    let id = state
        .home
        .join()
        .await
        .ok_or_else(|| ApiError::bad_request("Invalid meeting link"))?;

    let call_id = id.to_string();
    Ok(Json(json!({
        "call_id": call_id,
        "navigate_to": Route::Meeting(id).path(),
    })))
}

async fn view_recordings(State(state): State<SessionState>) -> Json<Value> {
    state.home.view_recordings();
    Json(json!({ "navigate_to": Route::Recordings.path() }))
}

async fn get_link(State(state): State<SessionState>) -> ApiResult<Json<Value>> {
    let link = state
        .home
        .link()
        .await
        .ok_or_else(|| ApiError::not_found("No meeting created yet"))?;

    Ok(Json(json!({ "link": link })))
}

/// POST /session/link/copy - Copy the meeting link to the desktop clipboard.
async fn copy_link(State(state): State<SessionState>) -> ApiResult<Json<Value>> {
    let link = state
        .home
        .link()
        .await
        .ok_or_else(|| ApiError::not_found("No meeting created yet"))?;

    let clipboard = Arc::clone(&state.clipboard);
    let text = link.clone();
    tokio::task::spawn_blocking(move || clipboard.blocking_lock().set_text(&text))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))??;

    state.home.link_copied();
    Ok(Json(json!({ "link": link, "copied": true })))
}
