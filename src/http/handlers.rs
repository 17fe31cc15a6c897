use super::state::AppState;
use crate::device::{InterfaceOrientation, Point};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FocusRequest {
    /// Normalized x coordinate (0.0 - 1.0)
    pub x: f64,
    /// Normalized y coordinate (0.0 - 1.0)
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct OrientationRequest {
    pub orientation: InterfaceOrientation,
}

#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub operation: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn queued(operation: &str) -> (StatusCode, Json<QueuedResponse>) {
    (
        StatusCode::ACCEPTED,
        Json(QueuedResponse {
            operation: operation.to_string(),
            status: "queued".to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /session
/// Snapshot taken after every previously queued operation
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.snapshot().await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => {
            error!("Failed to get session snapshot: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /ui
pub async fn get_ui(State(state): State<AppState>) -> impl IntoResponse {
    let ui = *state.ui.read().await;
    (StatusCode::OK, Json(ui))
}

/// POST /session/start
pub async fn start_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("Remote start session");
    state.controller.start_session();
    queued("start_session")
}

/// POST /session/stop
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("Remote stop session");
    state.controller.stop_session();
    queued("stop_session")
}

/// POST /session/resume
pub async fn resume_session(State(state): State<AppState>) -> impl IntoResponse {
    state.controller.resume_interrupted_session();
    queued("resume_interrupted_session")
}

/// POST /camera/switch
pub async fn switch_camera(State(state): State<AppState>) -> impl IntoResponse {
    state.controller.switch_camera();
    queued("switch_camera")
}

/// POST /recording/toggle
pub async fn toggle_recording(State(state): State<AppState>) -> impl IntoResponse {
    state.controller.toggle_recording();
    queued("toggle_recording")
}

/// POST /focus
pub async fn focus(State(state): State<AppState>, Json(req): Json<FocusRequest>) -> impl IntoResponse {
    if !(0.0..=1.0).contains(&req.x) || !(0.0..=1.0).contains(&req.y) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Point ({}, {}) is outside the unit square", req.x, req.y),
            }),
        )
            .into_response();
    }

    state.controller.focus_and_expose_tap(Point::new(req.x, req.y));
    queued("focus").into_response()
}

/// POST /orientation
pub async fn update_orientation(
    State(state): State<AppState>,
    Json(req): Json<OrientationRequest>,
) -> impl IntoResponse {
    state.controller.update_interface_orientation(req.orientation);
    queued("update_interface_orientation")
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
