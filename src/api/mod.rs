//! REST API server for flexmeet.
//!
//! Provides HTTP endpoints for:
//! - Home session control (action, draft, submit, join, link)
//! - Meeting routes (join state, device setup confirmation)

pub mod error;
pub mod routes;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tracing::info;

pub use routes::meeting::MeetingState;
pub use routes::session::SessionState;

pub struct ApiServer {
    port: u16,
    session_state: SessionState,
    meeting_state: MeetingState,
}

impl ApiServer {
    pub fn new(port: u16, session_state: SessionState, meeting_state: MeetingState) -> Self {
        Self {
            port,
            session_state,
            meeting_state,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(status))
            .route("/version", get(version))
            .merge(routes::session::router(self.session_state.clone()))
            .merge(routes::meeting::router(self.meeting_state.clone()))
            .layer(ServiceBuilder::new())
    }

    pub async fn start(self) -> Result<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET   /                   - Service info");
        info!("  GET   /version            - Get version info");
        info!("  GET   /session            - Session and panel state");
        info!("  POST  /session/action     - Select instant/join/schedule");
        info!("  POST  /session/clear      - Close the active panel");
        info!("  PATCH /session/draft      - Edit one draft field");
        info!("  POST  /session/submit     - Create the meeting");
        info!("  POST  /session/join       - Join via the entered link");
        info!("  POST  /session/recordings - Open recordings");
        info!("  GET   /session/link       - Shareable meeting link");
        info!("  POST  /session/link/copy  - Copy link to clipboard");
        info!("  GET   /meeting/:id        - Open a meeting route");
        info!("  POST  /meeting/:id/setup  - Confirm device setup");
        info!("  DELETE /meeting           - Leave the meeting route");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "flexmeet",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "flexmeet"
    }))
}
