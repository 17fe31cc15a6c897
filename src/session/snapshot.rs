use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{AuthorizationState, SessionConfigState, UiState};
use crate::device::VideoOrientation;

/// Point-in-time view of the controller, taken on the session queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub config_state: SessionConfigState,

    pub authorization: AuthorizationState,

    /// Whether the capture session was running when last observed
    pub is_session_running: bool,

    /// Id of the camera bound as the active video input
    pub active_device: Option<String>,

    pub has_audio_input: bool,

    pub has_movie_output: bool,

    /// Whether the movie output is writing a recording
    pub is_recording: bool,

    /// When the current recording was acknowledged by the output
    pub recording_started_at: Option<DateTime<Utc>>,

    /// Recordings moved into the photo library so far
    pub recordings_saved: usize,

    pub preview_orientation: VideoOrientation,

    /// Whether session observers are currently registered
    pub observing: bool,

    /// Last enablement flags pushed to the UI
    pub ui: UiState,
}
