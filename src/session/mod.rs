//! Capture session lifecycle controller
//!
//! This module provides the `CaptureSessionController`, which manages:
//! - Camera authorization and session configuration
//! - Starting, stopping and resuming the capture session
//! - Camera switching, focus and exposure
//! - Recording lifecycle and saving finished movies to the photo library
//! - Reacting to interruptions, runtime errors and system pressure
//!
//! All session work runs on one serialized queue; the UI observes the
//! outcome through `ControllerEvent`s.

mod config;
mod controller;
mod error;
mod events;
mod recording;
mod snapshot;
mod state;
mod worker;

pub use config::ControllerConfig;
pub use controller::CaptureSessionController;
pub use error::ControllerError;
pub use events::{ControllerEvent, EventReceiver};
pub use recording::{BackgroundTaskGuard, PendingRecordingFile};
pub use snapshot::ControllerSnapshot;
pub use state::{AuthorizationState, SessionConfigState, UiState};
