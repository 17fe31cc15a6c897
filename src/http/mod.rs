//! HTTP API for remote control of the capture session
//!
//! A remote UI collaborator drives the controller through these routes:
//! - GET /session - Controller snapshot
//! - GET /ui - Enablement flags folded from controller events
//! - POST /session/start | /session/stop | /session/resume
//! - POST /camera/switch - Switch to the opposite camera
//! - POST /recording/toggle - Start or stop recording
//! - POST /focus - Tap to focus and expose
//! - POST /orientation - Interface rotation
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
