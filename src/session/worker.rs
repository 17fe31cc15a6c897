// Session queue worker
//
// The worker owns the capture backend and every piece of mutable session
// state. It runs as a single tokio task and handles, one at a time:
// - commands enqueued by the controller handle
// - notifications from registered session observers
// - completion of the active recording
//
// Nothing else touches the capture session, so no locking is needed here.

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::config::ControllerConfig;
use super::error::ControllerError;
use super::events::{ControllerEvent, EventSink};
use super::recording::{ActiveRecording, BackgroundTaskGuard, PendingRecordingFile};
use super::snapshot::ControllerSnapshot;
use super::state::{AuthorizationState, SessionConfigState, UiState};
use crate::device::{
    AudioDevice, CaptureDevice, DeviceChanges, DiscoverySession, ExposureMode, FocusMode,
    InterfaceOrientation, Point, VideoOrientation,
};
use crate::platform::{
    AuthorizationStatus, BackgroundTaskHost, CaptureBackend, InterruptionReason, PhotoLibrary,
    Platform, PreviewSurface, RecordingOutcome, RecordingSettings, SessionNotification,
    SystemPressureLevel, VideoCodec, WindowOrientation,
};

/// Work items accepted by the session queue
#[derive(Debug)]
pub(crate) enum Command {
    CheckAuthorization,
    ConfigureSession,
    StartSession,
    StopSession,
    SwitchCamera,
    Focus {
        focus_mode: FocusMode,
        exposure_mode: ExposureMode,
        point: Point,
        monitor_subject_area_change: bool,
    },
    ToggleRecording,
    ResumeInterruptedSession,
    UpdateInterfaceOrientation(InterfaceOrientation),
    Snapshot(oneshot::Sender<ControllerSnapshot>),
    Shutdown,
}

enum Wake {
    Command(Option<Command>),
    Notification(Option<SessionNotification>),
    RecordingFinished(Result<RecordingOutcome, oneshot::error::RecvError>),
}

pub(crate) struct SessionWorker {
    config: ControllerConfig,
    capture: Box<dyn CaptureBackend>,
    library: Arc<dyn PhotoLibrary>,
    background: Arc<dyn BackgroundTaskHost>,
    window: Arc<dyn WindowOrientation>,
    preview: Arc<dyn PreviewSurface>,
    events: EventSink,

    config_state: SessionConfigState,
    authorization: AuthorizationState,
    active_input: Option<CaptureDevice>,
    audio_input: Option<AudioDevice>,
    has_movie_output: bool,
    /// Running flag as of the last start/stop/resume issued by this worker
    is_session_running: bool,
    preview_orientation: VideoOrientation,
    notifications: Option<mpsc::UnboundedReceiver<SessionNotification>>,
    /// Device whose subject-area-changed notifications are honored
    subject_area_device: Option<String>,
    recording: Option<ActiveRecording>,
    recordings_saved: usize,
    ui: UiState,
}

impl SessionWorker {
    pub(crate) fn new(platform: Platform, config: ControllerConfig, events: EventSink) -> Self {
        Self {
            config,
            capture: platform.capture,
            library: platform.library,
            background: platform.background,
            window: platform.window,
            preview: platform.preview,
            events,
            config_state: SessionConfigState::Success,
            authorization: AuthorizationState::Unknown,
            active_input: None,
            audio_input: None,
            has_movie_output: false,
            is_session_running: false,
            preview_orientation: VideoOrientation::default(),
            notifications: None,
            subject_area_device: None,
            recording: None,
            recordings_saved: 0,
            ui: UiState::default(),
        }
    }

    /// Drain the session queue until shutdown or a fatal start
    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
    ) -> Result<(), ControllerError> {
        info!("Session queue started (backend: {})", self.capture.name());

        loop {
            let wake = tokio::select! {
                biased;
                outcome = recording_finished(&mut self.recording) => Wake::RecordingFinished(outcome),
                notification = next_notification(&mut self.notifications) => Wake::Notification(notification),
                command = commands.recv() => Wake::Command(command),
            };

            match wake {
                Wake::Command(None) | Wake::Command(Some(Command::Shutdown)) => break,
                Wake::Command(Some(command)) => self.handle(command).await?,
                Wake::Notification(Some(notification)) => self.handle_notification(notification).await,
                Wake::Notification(None) => {
                    debug!("Session observers closed by backend");
                    self.notifications = None;
                }
                Wake::RecordingFinished(outcome) => self.finish_recording(outcome).await,
            }
        }

        info!("Session queue stopped");
        Ok(())
    }

    async fn handle(&mut self, command: Command) -> Result<(), ControllerError> {
        debug!("Session queue: {:?}", command);

        match command {
            Command::CheckAuthorization => self.check_authorization().await,
            Command::ConfigureSession => self.configure_session(),
            Command::StartSession => self.start_session().await?,
            Command::StopSession => self.stop_session().await,
            Command::SwitchCamera => self.switch_camera(),
            Command::Focus {
                focus_mode,
                exposure_mode,
                point,
                monitor_subject_area_change,
            } => self.focus(focus_mode, exposure_mode, point, monitor_subject_area_change),
            Command::ToggleRecording => self.toggle_recording(),
            Command::ResumeInterruptedSession => self.resume_interrupted_session().await,
            Command::UpdateInterfaceOrientation(orientation) => {
                self.update_interface_orientation(orientation)
            }
            Command::Snapshot(reply) => {
                if reply.send(self.snapshot()).is_err() {
                    debug!("Snapshot requester went away");
                }
            }
            Command::Shutdown => {}
        }

        Ok(())
    }

    fn publish(&mut self, event: ControllerEvent) {
        self.ui.apply(&event);
        self.events.publish(event);
    }

    /// Record the controls the handle disabled before enqueueing
    fn mirror_disabled_controls(&mut self) {
        self.ui.recording_enabled = false;
        self.ui.camera_switching_enabled = false;
    }

    fn discovery(&self) -> DiscoverySession {
        DiscoverySession::new(self.capture.video_devices())
    }

    // ------------------------------------------------------------------
    // Authorization and configuration
    // ------------------------------------------------------------------

    async fn check_authorization(&mut self) {
        match self.capture.authorization_status() {
            AuthorizationStatus::Authorized => {
                self.authorization = AuthorizationState::Authorized;
            }
            AuthorizationStatus::NotDetermined => {
                info!("Camera access undetermined, requesting");
                self.authorization = AuthorizationState::Requesting;

                if self.capture.request_access().await {
                    info!("Camera access granted");
                    self.authorization = AuthorizationState::Authorized;
                } else {
                    warn!("Camera access denied by user");
                    self.authorization = AuthorizationState::Denied;
                    self.config_state = SessionConfigState::NotAuthorized;
                }
            }
            status @ (AuthorizationStatus::Denied | AuthorizationStatus::Restricted) => {
                warn!("Camera access {:?}", status);
                self.authorization = AuthorizationState::Denied;
                self.config_state = SessionConfigState::NotAuthorized;
            }
        }
    }

    fn configure_session(&mut self) {
        if !self.config_state.is_success() {
            debug!("Skipping session configuration: {:?}", self.config_state);
            return;
        }
        if self.active_input.is_some() {
            debug!("Session already configured");
            return;
        }

        self.capture.begin_configuration();
        let result = self.configure_topology();
        self.capture.commit_configuration();

        match result {
            Ok(()) => {
                let orientation = VideoOrientation::initial(self.window.interface_orientation());
                self.set_preview_orientation(orientation);
                info!("Capture session configured");
            }
            Err(e) => {
                error!("Session configuration failed: {:#}", e);
                self.config_state = SessionConfigState::ConfigurationFailed;
            }
        }
    }

    fn configure_topology(&mut self) -> Result<()> {
        let device = self
            .discovery()
            .default_video_device()
            .cloned()
            .context("Default video device is unavailable")?;

        self.capture
            .add_video_input(&device)
            .with_context(|| format!("Couldn't add video device input for {}", device.id))?;

        info!("Video input: {} ({:?}, {:?})", device.id, device.device_type, device.position);
        self.subject_area_device = Some(device.id.clone());
        self.active_input = Some(device.clone());

        match self.capture.default_audio_device() {
            Some(audio) => match self.capture.add_audio_input(&audio) {
                Ok(()) => {
                    info!("Audio input: {}", audio.id);
                    self.audio_input = Some(audio);
                }
                Err(e) => warn!("Could not add audio device input: {:#}", e),
            },
            None => warn!("No audio device available"),
        }

        match self.capture.add_movie_output() {
            Ok(()) => {
                self.has_movie_output = true;
                if let Err(e) = self.capture.set_preset(self.config.preset) {
                    warn!("Could not apply session preset {:?}: {:#}", self.config.preset, e);
                }
                self.apply_stabilization(&device);
            }
            Err(e) => warn!("Could not add movie file output: {:#}", e),
        }

        Ok(())
    }

    fn apply_stabilization(&mut self, device: &CaptureDevice) {
        if !self.has_movie_output || !device.capabilities.supports_stabilization {
            return;
        }
        if let Err(e) = self.capture.set_stabilization(true) {
            warn!("Could not enable video stabilization: {:#}", e);
        }
    }

    fn set_preview_orientation(&mut self, orientation: VideoOrientation) {
        self.preview_orientation = orientation;
        self.preview.set_orientation(orientation);
    }

    fn update_interface_orientation(&mut self, orientation: InterfaceOrientation) {
        match VideoOrientation::from_interface(orientation) {
            Some(video) => self.set_preview_orientation(video),
            None => debug!("Ignoring unknown interface orientation"),
        }
    }

    // ------------------------------------------------------------------
    // Running state
    // ------------------------------------------------------------------

    async fn start_session(&mut self) -> Result<(), ControllerError> {
        if !self.config_state.is_success() {
            error!("Capture session cannot start: {:?}", self.config_state);
            self.publish(ControllerEvent::SessionFailed(self.config_state));
            return Err(ControllerError::SessionUnavailable(self.config_state));
        }

        if self.notifications.is_none() {
            self.notifications = Some(self.capture.observe());
        }

        if let Err(e) = self.capture.start_running().await {
            error!("Capture session failed to start: {:#}", e);
        }
        self.is_session_running = self.capture.is_running();
        info!("Capture session running: {}", self.is_session_running);

        Ok(())
    }

    async fn stop_session(&mut self) {
        if !self.config_state.is_success() {
            return;
        }

        if let Err(e) = self.capture.stop_running().await {
            warn!("Capture session failed to stop: {:#}", e);
        }
        self.is_session_running = self.capture.is_running();

        // Running-state changes raised by the stop are handled before the observers go away
        if let Some(mut notifications) = self.notifications.take() {
            while let Ok(notification) = notifications.try_recv() {
                self.handle_notification(notification).await;
            }
        }
        info!("Capture session stopped");
    }

    async fn resume_interrupted_session(&mut self) {
        if let Err(e) = self.capture.start_running().await {
            warn!("Capture session failed to resume: {:#}", e);
        }
        self.is_session_running = self.capture.is_running();

        if self.is_session_running {
            info!("Capture session resumed");
            self.publish(ControllerEvent::ResumingEnabled(false));
        } else {
            error!("Unable to resume capture session");
            self.publish(ControllerEvent::ResumeFailed);
        }
    }

    // ------------------------------------------------------------------
    // Camera switching and focus
    // ------------------------------------------------------------------

    fn switch_camera(&mut self) {
        self.mirror_disabled_controls();
        let discovery = self.discovery();

        match self.active_input.clone() {
            Some(current) => match discovery.switch_target(current.position).cloned() {
                Some(target) => self.replace_video_input(current, target),
                None => warn!("No camera available opposite {:?}", current.position),
            },
            None => warn!("No active video input to switch from"),
        }

        self.publish(ControllerEvent::RecordingEnabled(self.has_movie_output));
        self.publish(ControllerEvent::CameraSwitchingEnabled(discovery.can_switch()));
    }

    fn replace_video_input(&mut self, current: CaptureDevice, target: CaptureDevice) {
        self.capture.begin_configuration();
        self.capture.remove_video_input(&current);

        match self.capture.add_video_input(&target) {
            Ok(()) => {
                info!("Switched camera: {} -> {}", current.id, target.id);
                self.subject_area_device = Some(target.id.clone());
                self.active_input = Some(target);
            }
            Err(e) => {
                warn!("Could not add {}: {:#}; restoring {}", target.id, e, current.id);
                if let Err(e) = self.capture.add_video_input(&current) {
                    error!("Could not restore video input {}: {:#}", current.id, e);
                    self.active_input = None;
                    self.subject_area_device = None;
                }
            }
        }

        if let Some(active) = self.active_input.clone() {
            self.apply_stabilization(&active);
        }

        self.capture.commit_configuration();
    }

    fn focus(
        &mut self,
        focus_mode: FocusMode,
        exposure_mode: ExposureMode,
        point: Point,
        monitor_subject_area_change: bool,
    ) {
        let Some(device) = self.active_input.clone() else {
            debug!("No active camera to focus");
            return;
        };
        let caps = &device.capabilities;

        let mut changes = DeviceChanges {
            subject_area_monitoring: Some(monitor_subject_area_change),
            ..DeviceChanges::default()
        };
        if caps.focus_point_supported && caps.supports_focus_mode(focus_mode) {
            changes.focus = Some((focus_mode, point));
        }
        if caps.exposure_point_supported && caps.supports_exposure_mode(exposure_mode) {
            changes.exposure = Some((exposure_mode, point));
        }

        if let Err(e) = self.capture.apply_device_changes(&device, &changes) {
            warn!("Could not lock device for configuration: {:#}", e);
        }
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    fn toggle_recording(&mut self) {
        self.mirror_disabled_controls();

        if !self.has_movie_output {
            warn!("No movie output, cannot record");
            let can_switch = self.is_session_running && self.discovery().can_switch();
            self.publish(ControllerEvent::CameraSwitchingEnabled(can_switch));
            return;
        }

        match self.recording.as_mut() {
            None => self.start_recording(),
            Some(active) if active.stop_requested => {
                debug!("Recording stop already requested");
            }
            Some(active) => {
                active.stop_requested = true;
                info!("Stopping recording");

                if let Err(e) = self.capture.stop_recording() {
                    error!("Could not stop recording: {:#}", e);
                    if let Some(active) = self.recording.as_mut() {
                        active.stop_requested = false;
                    }
                    self.publish(ControllerEvent::RecordingEnabled(true));
                }
            }
        }
    }

    fn preferred_codec(&self) -> Option<VideoCodec> {
        let hevc = self.config.prefer_hevc && self.capture.available_codecs().contains(&VideoCodec::Hevc);
        hevc.then_some(VideoCodec::Hevc)
    }

    fn start_recording(&mut self) {
        let background_task =
            BackgroundTaskGuard::begin(Arc::clone(&self.background), &self.config.background_task_name);
        let settings = RecordingSettings {
            orientation: self.preview_orientation,
            codec: self.preferred_codec(),
        };
        let file = PendingRecordingFile::new(&self.config.temp_dir);

        match self.capture.start_recording(file.path(), &settings) {
            Ok(finished) => {
                info!(
                    "Recording started: {:?} ({:?}, {:?})",
                    file.path(),
                    settings.orientation,
                    settings.codec
                );
                self.recording = Some(ActiveRecording {
                    file,
                    background_task,
                    finished,
                    started_at: Utc::now(),
                    stop_requested: false,
                });
                self.publish(ControllerEvent::RecordingEnabled(true));
                self.publish(ControllerEvent::IsRecording(true));
            }
            Err(e) => {
                error!("Could not start recording: {:#}", e);
                file.cleanup();
                background_task.end();
                self.publish_recording_idle();
            }
        }
    }

    async fn finish_recording(&mut self, outcome: Result<RecordingOutcome, oneshot::error::RecvError>) {
        let Some(active) = self.recording.take() else {
            return;
        };
        let ActiveRecording {
            file,
            background_task,
            started_at,
            ..
        } = active;

        let success = match outcome {
            Ok(outcome) => {
                if let Some(e) = &outcome.error {
                    warn!(
                        "Movie file finishing error: {} (finished successfully: {})",
                        e.message, e.finished_successfully
                    );
                }
                outcome.succeeded()
            }
            Err(_) => {
                error!("Movie output went away without finishing the recording");
                false
            }
        };

        let duration = Utc::now().signed_duration_since(started_at);
        info!(
            "Recording finished after {:.1}s (success: {})",
            duration.num_milliseconds() as f64 / 1000.0,
            success
        );

        if success {
            if let Err(e) = self.save_to_library(&file).await {
                error!("Could not save movie to photo library: {:#}", e);
            }
        }

        file.cleanup();
        background_task.end();
        self.publish_recording_idle();
    }

    async fn save_to_library(&mut self, file: &PendingRecordingFile) -> Result<()> {
        let authorization = self.library.request_authorization().await;
        if !authorization.can_add() {
            warn!("Photo library access {:?}, discarding recording", authorization);
            return Ok(());
        }

        self.library.save_video(file.path()).await?;
        self.recordings_saved += 1;
        Ok(())
    }

    fn publish_recording_idle(&mut self) {
        let can_switch = self.discovery().can_switch();
        self.publish(ControllerEvent::CameraSwitchingEnabled(can_switch));
        self.publish(ControllerEvent::RecordingEnabled(true));
        self.publish(ControllerEvent::IsRecording(false));
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    async fn handle_notification(&mut self, notification: SessionNotification) {
        debug!("Session notification: {:?}", notification);

        match notification {
            SessionNotification::RunningChanged { running } => {
                let can_switch = running && self.discovery().can_switch();
                self.publish(ControllerEvent::CameraSwitchingEnabled(can_switch));
                self.publish(ControllerEvent::RecordingEnabled(running && self.has_movie_output));
            }
            SessionNotification::SystemPressureChanged { device_id, level } => {
                self.system_pressure_changed(&device_id, level)
            }
            SessionNotification::RuntimeError {
                media_services_reset,
                message,
            } => self.runtime_error(media_services_reset, &message).await,
            SessionNotification::Interrupted { reason } => self.session_interrupted(reason),
            SessionNotification::InterruptionEnded => {
                info!("Capture session interruption ended");
                if self.ui.resuming_enabled {
                    self.publish(ControllerEvent::ResumingEnabled(false));
                }
            }
            SessionNotification::SubjectAreaChanged { device_id } => {
                if self.subject_area_device.as_deref() == Some(device_id.as_str()) {
                    self.focus(
                        FocusMode::ContinuousAutoFocus,
                        ExposureMode::ContinuousAutoExposure,
                        Point::CENTER,
                        false,
                    );
                } else {
                    debug!("Ignoring subject area change from inactive device {}", device_id);
                }
            }
        }
    }

    fn system_pressure_changed(&mut self, device_id: &str, level: SystemPressureLevel) {
        match level {
            SystemPressureLevel::Serious | SystemPressureLevel::Critical => {
                if self.recording.is_some() {
                    debug!("System pressure {:?} while recording, not throttling", level);
                    return;
                }
                let Some(device) = self.active_input.clone().filter(|d| d.id == device_id) else {
                    debug!("System pressure from inactive device {}", device_id);
                    return;
                };

                let range = self.config.throttled_frame_rate;
                if !device.capabilities.frame_rate_range.contains(&range) {
                    warn!("{} cannot run at {}-{} fps", device.id, range.min_fps, range.max_fps);
                    return;
                }

                warn!("Reached elevated system pressure level: {:?}. Throttling frame rate.", level);
                let changes = DeviceChanges {
                    frame_rate: Some(range),
                    ..DeviceChanges::default()
                };
                if let Err(e) = self.capture.apply_device_changes(&device, &changes) {
                    warn!("Could not lock device for configuration: {:#}", e);
                }
            }
            SystemPressureLevel::Shutdown => {
                // No action decided yet; the platform stops the session itself.
                info!("Session stopped running due to shutdown system pressure level");
            }
            SystemPressureLevel::Nominal | SystemPressureLevel::Fair => {}
        }
    }

    async fn runtime_error(&mut self, media_services_reset: bool, message: &str) {
        error!("Capture session runtime error: {}", message);

        if !media_services_reset {
            self.publish(ControllerEvent::ResumingEnabled(true));
            return;
        }

        if self.is_session_running {
            info!("Media services were reset, restarting session");
            if let Err(e) = self.capture.start_running().await {
                warn!("Restart after media services reset failed: {:#}", e);
            }
            self.is_session_running = self.capture.is_running();
        } else {
            self.publish(ControllerEvent::ResumingEnabled(true));
        }
    }

    fn session_interrupted(&mut self, reason: InterruptionReason) {
        info!("Capture session was interrupted: {:?}", reason);

        match reason {
            InterruptionReason::AudioDeviceInUseByAnotherClient
            | InterruptionReason::VideoDeviceInUseByAnotherClient => {
                self.publish(ControllerEvent::ResumingEnabled(true));
            }
            InterruptionReason::VideoDeviceNotAvailableWithMultipleForegroundApps => {
                // Camera-unavailable indicator has no signal yet.
                debug!("Camera unavailable while other apps share the foreground");
            }
            InterruptionReason::VideoDeviceNotAvailableDueToSystemPressure => {
                info!("Camera unavailable due to system pressure");
            }
            InterruptionReason::VideoDeviceNotAvailableInBackground => {}
        }
    }

    fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            config_state: self.config_state,
            authorization: self.authorization,
            is_session_running: self.is_session_running,
            active_device: self.active_input.as_ref().map(|d| d.id.clone()),
            has_audio_input: self.audio_input.is_some(),
            has_movie_output: self.has_movie_output,
            is_recording: self.recording.is_some(),
            recording_started_at: self.recording.as_ref().map(|r| r.started_at),
            recordings_saved: self.recordings_saved,
            preview_orientation: self.preview_orientation,
            observing: self.notifications.is_some(),
            ui: self.ui,
        }
    }
}

async fn recording_finished(
    recording: &mut Option<ActiveRecording>,
) -> Result<RecordingOutcome, oneshot::error::RecvError> {
    match recording {
        Some(active) => (&mut active.finished).await,
        None => std::future::pending().await,
    }
}

async fn next_notification(
    notifications: &mut Option<mpsc::UnboundedReceiver<SessionNotification>>,
) -> Option<SessionNotification> {
    match notifications {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
