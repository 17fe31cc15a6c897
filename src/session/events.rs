use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use super::state::SessionConfigState;

/// Signals the controller sends to its UI collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "value", rename_all = "snake_case")]
pub enum ControllerEvent {
    /// Record control should be enabled/disabled
    RecordingEnabled(bool),
    /// Recording is active
    IsRecording(bool),
    /// Switch-camera control should be enabled/disabled
    CameraSwitchingEnabled(bool),
    /// Resume affordance should be shown/hidden
    ResumingEnabled(bool),
    /// A resume attempt failed; surface to the user
    ResumeFailed,
    /// The session was started after setup failed; the controller has stopped
    SessionFailed(SessionConfigState),
}

/// Receiving end consumed on the UI's own context
pub type EventReceiver = mpsc::UnboundedReceiver<ControllerEvent>;

/// Sending side shared by the controller handle and the session queue
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl EventSink {
    pub(crate) fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub(crate) fn publish(&self, event: ControllerEvent) {
        debug!("UI signal: {:?}", event);
        if self.tx.send(event).is_err() {
            debug!("UI collaborator gone, dropping {:?}", event);
        }
    }
}
