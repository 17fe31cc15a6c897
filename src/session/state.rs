use serde::{Deserialize, Serialize};

use super::events::ControllerEvent;

/// Outcome of session setup; anything but `Success` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionConfigState {
    Success,
    NotAuthorized,
    ConfigurationFailed,
}

impl SessionConfigState {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Camera authorization as tracked by the controller
///
/// ```text
/// Unknown → Requesting → Authorized
///    │                 ↘ Denied
///    └──────────────→ Authorized / Denied
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    Unknown,
    Requesting,
    Authorized,
    Denied,
}

/// Observer-facing enablement flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub recording_enabled: bool,
    pub is_recording: bool,
    pub camera_switching_enabled: bool,
    pub resuming_enabled: bool,
    /// Set once a resume attempt failed
    pub resume_failed: bool,
    pub session_failed: Option<SessionConfigState>,
}

impl UiState {
    /// Fold one controller event into the state
    pub fn apply(&mut self, event: &ControllerEvent) {
        match *event {
            ControllerEvent::RecordingEnabled(enabled) => self.recording_enabled = enabled,
            ControllerEvent::IsRecording(recording) => self.is_recording = recording,
            ControllerEvent::CameraSwitchingEnabled(enabled) => self.camera_switching_enabled = enabled,
            ControllerEvent::ResumingEnabled(enabled) => self.resuming_enabled = enabled,
            ControllerEvent::ResumeFailed => self.resume_failed = true,
            ControllerEvent::SessionFailed(state) => self.session_failed = Some(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_state_folds_events() {
        let mut ui = UiState::default();

        for event in [
            ControllerEvent::RecordingEnabled(true),
            ControllerEvent::CameraSwitchingEnabled(true),
            ControllerEvent::IsRecording(true),
            ControllerEvent::IsRecording(false),
            ControllerEvent::ResumingEnabled(true),
        ] {
            ui.apply(&event);
        }

        assert!(ui.recording_enabled);
        assert!(!ui.is_recording);
        assert!(ui.camera_switching_enabled);
        assert!(ui.resuming_enabled);
        assert!(!ui.resume_failed);
        assert_eq!(ui.session_failed, None);
    }

    #[test]
    fn test_ui_state_terminal_events() {
        let mut ui = UiState::default();
        ui.apply(&ControllerEvent::ResumeFailed);
        ui.apply(&ControllerEvent::SessionFailed(SessionConfigState::NotAuthorized));

        assert!(ui.resume_failed);
        assert_eq!(ui.session_failed, Some(SessionConfigState::NotAuthorized));
    }
}
