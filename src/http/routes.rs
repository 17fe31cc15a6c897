use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/session", get(handlers::get_session))
        .route("/session/start", post(handlers::start_session))
        .route("/session/stop", post(handlers::stop_session))
        .route("/session/resume", post(handlers::resume_session))
        // Camera and recording controls
        .route("/camera/switch", post(handlers::switch_camera))
        .route("/recording/toggle", post(handlers::toggle_recording))
        .route("/focus", post(handlers::focus))
        .route("/orientation", post(handlers::update_orientation))
        // UI enablement flags
        .route("/ui", get(handlers::get_ui))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
