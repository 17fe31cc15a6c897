use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::config::ControllerConfig;
use super::error::ControllerError;
use super::events::{ControllerEvent, EventReceiver, EventSink};
use super::snapshot::ControllerSnapshot;
use super::worker::{Command, SessionWorker};
use crate::device::{ExposureMode, FocusMode, InterfaceOrientation, Point};
use crate::platform::Platform;

/// Handle onto a capture session controller
///
/// Every operation enqueues work on the controller's session queue and
/// returns immediately. Results reach the UI as `ControllerEvent`s on the
/// receiver returned by `spawn`. Cloned handles share the same queue.
#[derive(Clone)]
pub struct CaptureSessionController {
    commands: mpsc::UnboundedSender<Command>,
    events: EventSink,
    queue: Arc<Mutex<Option<JoinHandle<Result<(), ControllerError>>>>>,
}

impl CaptureSessionController {
    /// Spawn the session queue on the current tokio runtime
    pub fn spawn(platform: Platform, config: ControllerConfig) -> (Self, EventReceiver) {
        let (events, event_rx) = EventSink::channel();
        let (commands, command_rx) = mpsc::unbounded_channel();

        info!("Spawning capture session controller (temp dir: {:?})", config.temp_dir);

        let worker = SessionWorker::new(platform, config, events.clone());
        let queue = tokio::spawn(worker.run(command_rx));

        let controller = Self {
            commands,
            events,
            queue: Arc::new(Mutex::new(Some(queue))),
        };

        (controller, event_rx)
    }

    fn enqueue(&self, command: Command) {
        if let Err(e) = self.commands.send(command) {
            warn!("Session queue closed, dropping {:?}", e.0);
        }
    }

    /// Disable record and switch controls before work that changes them
    fn disable_controls(&self) {
        self.events.publish(ControllerEvent::RecordingEnabled(false));
        self.events.publish(ControllerEvent::CameraSwitchingEnabled(false));
    }

    /// Check camera authorization, then configure the session
    ///
    /// When access is undetermined the permission prompt runs on the session
    /// queue, so later operations wait for the decision.
    pub fn check_authorization(&self) {
        self.enqueue(Command::CheckAuthorization);
        self.enqueue(Command::ConfigureSession);
    }

    /// Configure inputs and outputs; a no-op unless setup has succeeded so far
    pub fn configure_session(&self) {
        self.enqueue(Command::ConfigureSession);
    }

    /// Register observers and start the session
    ///
    /// Starting after authorization or configuration failed is fatal: the
    /// controller emits `SessionFailed` and its session queue stops.
    pub fn start_session(&self) {
        self.enqueue(Command::StartSession);
    }

    /// Stop the session and deregister observers
    pub fn stop_session(&self) {
        self.enqueue(Command::StopSession);
    }

    /// Switch to the best camera on the opposite side
    pub fn switch_camera(&self) {
        self.disable_controls();
        self.enqueue(Command::SwitchCamera);
    }

    pub fn focus(
        &self,
        focus_mode: FocusMode,
        exposure_mode: ExposureMode,
        point: Point,
        monitor_subject_area_change: bool,
    ) {
        self.enqueue(Command::Focus {
            focus_mode,
            exposure_mode,
            point,
            monitor_subject_area_change,
        });
    }

    /// Tap-to-focus: auto focus and expose once at `point`, then watch for subject changes
    pub fn focus_and_expose_tap(&self, point: Point) {
        self.focus(FocusMode::AutoFocus, ExposureMode::AutoExpose, point, true);
    }

    /// Start a recording when idle, stop it when recording
    pub fn toggle_recording(&self) {
        self.disable_controls();
        self.enqueue(Command::ToggleRecording);
    }

    pub fn resume_interrupted_session(&self) {
        self.enqueue(Command::ResumeInterruptedSession);
    }

    /// Follow an interface rotation with the preview and future recordings
    pub fn update_interface_orientation(&self, orientation: InterfaceOrientation) {
        self.enqueue(Command::UpdateInterfaceOrientation(orientation));
    }

    /// State of the controller once every previously enqueued operation has run
    pub async fn snapshot(&self) -> Result<ControllerSnapshot, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(tx))
            .map_err(|_| ControllerError::QueueClosed)?;
        rx.await.map_err(|_| ControllerError::QueueClosed)
    }

    /// Stop the session queue after pending operations and wait for it
    pub async fn shutdown(&self) -> Result<(), ControllerError> {
        let _ = self.commands.send(Command::Shutdown);

        let Some(queue) = self.queue.lock().await.take() else {
            return Ok(());
        };

        match queue.await {
            Ok(result) => result,
            Err(e) => {
                error!("Session queue panicked: {}", e);
                Err(ControllerError::QueueClosed)
            }
        }
    }
}
