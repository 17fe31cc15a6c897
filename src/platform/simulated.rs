// In-memory platform used by the CLI and the integration tests
//
// The simulated capture backend tracks the session graph (bound inputs,
// movie output, running flag) instead of driving hardware. Recordings write a
// small placeholder file to the requested path, and the simulated photo
// library moves finished files into a directory. A `SimulatedProbe` shares the
// state so callers can inject platform notifications and inspect the graph.

use anyhow::{anyhow, bail, Context, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::backend::{
    AuthorizationStatus, CaptureBackend, RecordingError, RecordingFinished, RecordingOutcome,
    RecordingSettings, SessionNotification, SessionPreset, VideoCodec,
};
use super::services::{
    BackgroundTaskHost, BackgroundTaskId, LibraryAuthorization, PhotoLibrary, Platform,
    PreviewSurface, WindowOrientation,
};
use crate::device::{
    AudioDevice, CaptureDevice, DeviceChanges, DeviceType, InterfaceOrientation, Position,
    VideoOrientation,
};

const PLACEHOLDER_MOVIE: &[u8] = b"simulated movie";

/// Initial state of the simulated platform
#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    pub devices: Vec<CaptureDevice>,
    pub audio_device: Option<AudioDevice>,
    pub authorization: AuthorizationStatus,
    /// Answer given to the camera permission prompt
    pub grant_access: bool,
    pub accepts_movie_output: bool,
    /// Device ids whose inputs the session refuses
    pub rejected_inputs: HashSet<String>,
    pub codecs: Vec<VideoCodec>,
    pub library_dir: PathBuf,
    pub library_authorization: LibraryAuthorization,
    pub supports_background_tasks: bool,
    pub window_orientation: InterfaceOrientation,
}

impl SimulatedConfig {
    /// A phone with a dual-wide and wide back camera and a true-depth and wide front camera
    pub fn phone(library_dir: impl Into<PathBuf>) -> Self {
        Self {
            devices: vec![
                CaptureDevice::new("back-dual-wide", DeviceType::DualWide, Position::Back),
                CaptureDevice::new("back-wide", DeviceType::WideAngle, Position::Back),
                CaptureDevice::new("front-true-depth", DeviceType::TrueDepth, Position::Front),
                CaptureDevice::new("front-wide", DeviceType::WideAngle, Position::Front),
            ],
            audio_device: Some(AudioDevice {
                id: "built-in-microphone".to_string(),
            }),
            authorization: AuthorizationStatus::Authorized,
            grant_access: true,
            accepts_movie_output: true,
            rejected_inputs: HashSet::new(),
            codecs: vec![VideoCodec::Hevc, VideoCodec::H264],
            library_dir: library_dir.into(),
            library_authorization: LibraryAuthorization::Authorized,
            supports_background_tasks: true,
            window_orientation: InterfaceOrientation::Portrait,
        }
    }
}

struct ActiveOutput {
    path: PathBuf,
    settings: RecordingSettings,
    finished: oneshot::Sender<RecordingOutcome>,
}

struct SimState {
    config: SimulatedConfig,
    fail_start: bool,
    fail_device_lock: bool,
    running: bool,
    in_transaction: bool,
    transactions: usize,
    unguarded_mutations: usize,
    access_requests: usize,
    preset: Option<SessionPreset>,
    video_inputs: Vec<String>,
    audio_inputs: Vec<String>,
    movie_output: bool,
    stabilization: bool,
    device_changes: Vec<(String, DeviceChanges)>,
    observers: Vec<mpsc::UnboundedSender<SessionNotification>>,
    recording: Option<ActiveOutput>,
    last_recording_settings: Option<RecordingSettings>,
    next_recording_error: Option<RecordingError>,
    recordings_started: usize,
    saved_assets: Vec<PathBuf>,
    next_task_id: u64,
    tasks_begun: Vec<BackgroundTaskId>,
    tasks_ended: Vec<BackgroundTaskId>,
    preview_orientation: Option<VideoOrientation>,
}

impl SimState {
    fn new(config: SimulatedConfig) -> Self {
        Self {
            config,
            fail_start: false,
            fail_device_lock: false,
            running: false,
            in_transaction: false,
            transactions: 0,
            unguarded_mutations: 0,
            access_requests: 0,
            preset: None,
            video_inputs: Vec::new(),
            audio_inputs: Vec::new(),
            movie_output: false,
            stabilization: false,
            device_changes: Vec::new(),
            observers: Vec::new(),
            recording: None,
            last_recording_settings: None,
            next_recording_error: None,
            recordings_started: 0,
            saved_assets: Vec::new(),
            next_task_id: 1,
            tasks_begun: Vec::new(),
            tasks_ended: Vec::new(),
            preview_orientation: None,
        }
    }

    fn guard_mutation(&mut self, what: &str) {
        if !self.in_transaction {
            warn!("Session mutation outside configuration transaction: {}", what);
            self.unguarded_mutations += 1;
        }
    }

    fn notify(&mut self, notification: SessionNotification) {
        self.observers.retain(|tx| tx.send(notification.clone()).is_ok());
    }

    fn finish_recording(&mut self, error: Option<RecordingError>) -> Result<()> {
        let output = self
            .recording
            .take()
            .ok_or_else(|| anyhow!("No recording in progress"))?;

        let outcome = RecordingOutcome {
            output_path: output.path,
            error,
        };

        if output.finished.send(outcome).is_err() {
            warn!("Recording finished but nobody was waiting for it");
        }

        Ok(())
    }
}

type Shared = Arc<Mutex<SimState>>;

/// Builds a `Platform` backed entirely by in-memory state
pub struct SimulatedPlatform;

impl SimulatedPlatform {
    pub fn new(config: SimulatedConfig) -> (Platform, SimulatedProbe) {
        let state: Shared = Arc::new(Mutex::new(SimState::new(config)));

        let platform = Platform {
            capture: Box::new(SimulatedCapture {
                state: Arc::clone(&state),
            }),
            library: Arc::new(SimulatedLibrary {
                state: Arc::clone(&state),
            }),
            background: Arc::new(SimulatedBackgroundHost {
                state: Arc::clone(&state),
            }),
            window: Arc::new(SimulatedWindow {
                state: Arc::clone(&state),
            }),
            preview: Arc::new(SimulatedPreview {
                state: Arc::clone(&state),
            }),
        };

        (platform, SimulatedProbe { state })
    }
}

struct SimulatedCapture {
    state: Shared,
}

#[async_trait::async_trait]
impl CaptureBackend for SimulatedCapture {
    fn name(&self) -> &str {
        "simulated"
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.state.lock().config.authorization
    }

    async fn request_access(&mut self) -> bool {
        tokio::task::yield_now().await;

        let mut state = self.state.lock();
        state.access_requests += 1;
        state.config.authorization = if state.config.grant_access {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        };
        state.config.grant_access
    }

    fn video_devices(&self) -> Vec<CaptureDevice> {
        self.state.lock().config.devices.clone()
    }

    fn default_audio_device(&self) -> Option<AudioDevice> {
        self.state.lock().config.audio_device.clone()
    }

    fn begin_configuration(&mut self) {
        self.state.lock().in_transaction = true;
    }

    fn commit_configuration(&mut self) {
        let mut state = self.state.lock();
        state.in_transaction = false;
        state.transactions += 1;
    }

    fn set_preset(&mut self, preset: SessionPreset) -> Result<()> {
        let mut state = self.state.lock();
        state.guard_mutation("set_preset");
        state.preset = Some(preset);
        Ok(())
    }

    fn add_video_input(&mut self, device: &CaptureDevice) -> Result<()> {
        let mut state = self.state.lock();
        state.guard_mutation("add_video_input");

        if state.config.rejected_inputs.contains(&device.id) {
            bail!("Session cannot add input for {}", device.id);
        }
        if !state.video_inputs.is_empty() {
            bail!("Session already has a video input");
        }

        state.video_inputs.push(device.id.clone());
        Ok(())
    }

    fn remove_video_input(&mut self, device: &CaptureDevice) {
        let mut state = self.state.lock();
        state.guard_mutation("remove_video_input");
        state.video_inputs.retain(|id| id != &device.id);
    }

    fn add_audio_input(&mut self, device: &AudioDevice) -> Result<()> {
        let mut state = self.state.lock();
        state.guard_mutation("add_audio_input");

        if state.config.rejected_inputs.contains(&device.id) {
            bail!("Session cannot add audio input {}", device.id);
        }

        state.audio_inputs.push(device.id.clone());
        Ok(())
    }

    fn add_movie_output(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.guard_mutation("add_movie_output");

        if !state.config.accepts_movie_output {
            bail!("Session cannot add a movie file output");
        }

        state.movie_output = true;
        Ok(())
    }

    fn set_stabilization(&mut self, enabled: bool) -> Result<()> {
        let mut state = self.state.lock();
        state.guard_mutation("set_stabilization");

        if !state.movie_output {
            bail!("No movie output connection");
        }

        state.stabilization = enabled;
        Ok(())
    }

    fn apply_device_changes(&mut self, device: &CaptureDevice, changes: &DeviceChanges) -> Result<()> {
        let mut state = self.state.lock();

        if state.fail_device_lock {
            bail!("Could not lock device {} for configuration", device.id);
        }

        state.device_changes.push((device.id.clone(), changes.clone()));
        Ok(())
    }

    async fn start_running(&mut self) -> Result<()> {
        let mut state = self.state.lock();

        if state.fail_start {
            bail!("Capture session failed to start");
        }
        if !state.running {
            state.running = true;
            state.notify(SessionNotification::RunningChanged { running: true });
        }

        Ok(())
    }

    async fn stop_running(&mut self) -> Result<()> {
        let mut state = self.state.lock();

        if state.running {
            state.running = false;
            state.notify(SessionNotification::RunningChanged { running: false });
        }

        Ok(())
    }

    fn is_running(&self) -> bool {
        self.state.lock().running
    }

    fn observe(&mut self) -> mpsc::UnboundedReceiver<SessionNotification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().observers.push(tx);
        rx
    }

    fn available_codecs(&self) -> Vec<VideoCodec> {
        self.state.lock().config.codecs.clone()
    }

    fn start_recording(&mut self, path: &Path, settings: &RecordingSettings) -> Result<RecordingFinished> {
        let mut state = self.state.lock();

        if !state.movie_output {
            bail!("No movie output");
        }
        if state.recording.is_some() {
            bail!("Movie output is already recording");
        }

        std::fs::write(path, PLACEHOLDER_MOVIE)
            .with_context(|| format!("Failed to create movie file: {:?}", path))?;

        let (tx, rx) = oneshot::channel();
        state.recording = Some(ActiveOutput {
            path: path.to_path_buf(),
            settings: settings.clone(),
            finished: tx,
        });
        state.last_recording_settings = Some(settings.clone());
        state.recordings_started += 1;

        debug!("Simulated recording started: {:?}", path);

        Ok(rx)
    }

    fn stop_recording(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        let error = state.next_recording_error.take();
        state.finish_recording(error)
    }
}

struct SimulatedLibrary {
    state: Shared,
}

#[async_trait::async_trait]
impl PhotoLibrary for SimulatedLibrary {
    async fn request_authorization(&self) -> LibraryAuthorization {
        self.state.lock().config.library_authorization
    }

    async fn save_video(&self, file: &Path) -> Result<()> {
        let library_dir = self.state.lock().config.library_dir.clone();

        let file_name = file
            .file_name()
            .ok_or_else(|| anyhow!("Recording path has no file name: {:?}", file))?;
        let asset = library_dir.join(file_name);

        tokio::fs::create_dir_all(&library_dir)
            .await
            .context("Failed to create library directory")?;
        tokio::fs::rename(file, &asset)
            .await
            .with_context(|| format!("Failed to move {:?} into the library", file))?;

        info!("Saved video asset: {:?}", asset);
        self.state.lock().saved_assets.push(asset);

        Ok(())
    }
}

struct SimulatedBackgroundHost {
    state: Shared,
}

impl BackgroundTaskHost for SimulatedBackgroundHost {
    fn begin_task(&self, name: &str) -> Option<BackgroundTaskId> {
        let mut state = self.state.lock();

        if !state.config.supports_background_tasks {
            return None;
        }

        let id = BackgroundTaskId(state.next_task_id);
        state.next_task_id += 1;
        state.tasks_begun.push(id);
        debug!("Background task {} begun: {}", id.0, name);

        Some(id)
    }

    fn end_task(&self, id: BackgroundTaskId) {
        self.state.lock().tasks_ended.push(id);
    }
}

struct SimulatedWindow {
    state: Shared,
}

impl WindowOrientation for SimulatedWindow {
    fn interface_orientation(&self) -> InterfaceOrientation {
        self.state.lock().config.window_orientation
    }
}

struct SimulatedPreview {
    state: Shared,
}

impl PreviewSurface for SimulatedPreview {
    fn set_orientation(&self, orientation: VideoOrientation) {
        self.state.lock().preview_orientation = Some(orientation);
    }
}

/// Test and demo handle onto the simulated platform
#[derive(Clone)]
pub struct SimulatedProbe {
    state: Shared,
}

impl SimulatedProbe {
    /// Deliver a notification to every registered observer
    pub fn post(&self, notification: SessionNotification) {
        self.state.lock().notify(notification);
    }

    /// The session stops and observers receive a media-services-reset runtime error
    pub fn simulate_media_services_reset(&self) {
        let mut state = self.state.lock();
        if state.running {
            state.running = false;
            state.notify(SessionNotification::RunningChanged { running: false });
        }
        state.notify(SessionNotification::RuntimeError {
            media_services_reset: true,
            message: "Media services were reset".to_string(),
        });
    }

    pub fn observer_count(&self) -> usize {
        let mut state = self.state.lock();
        state.observers.retain(|tx| !tx.is_closed());
        state.observers.len()
    }

    /// Finish the active recording as the output would, e.g. on a disk-full error
    pub fn finish_recording(&self, error: Option<RecordingError>) -> Result<()> {
        self.state.lock().finish_recording(error)
    }

    /// Error the output reports when the next recording is stopped
    pub fn set_next_recording_error(&self, error: Option<RecordingError>) {
        self.state.lock().next_recording_error = error;
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.state.lock().fail_start = fail;
    }

    pub fn set_fail_device_lock(&self, fail: bool) {
        self.state.lock().fail_device_lock = fail;
    }

    pub fn set_window_orientation(&self, orientation: InterfaceOrientation) {
        self.state.lock().config.window_orientation = orientation;
    }

    pub fn set_library_authorization(&self, authorization: LibraryAuthorization) {
        self.state.lock().config.library_authorization = authorization;
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn video_inputs(&self) -> Vec<String> {
        self.state.lock().video_inputs.clone()
    }

    pub fn audio_inputs(&self) -> Vec<String> {
        self.state.lock().audio_inputs.clone()
    }

    pub fn has_movie_output(&self) -> bool {
        self.state.lock().movie_output
    }

    pub fn stabilization(&self) -> bool {
        self.state.lock().stabilization
    }

    pub fn preset(&self) -> Option<SessionPreset> {
        self.state.lock().preset
    }

    pub fn transactions(&self) -> usize {
        self.state.lock().transactions
    }

    /// Topology mutations issued outside begin/commit
    pub fn unguarded_mutations(&self) -> usize {
        self.state.lock().unguarded_mutations
    }

    pub fn access_requests(&self) -> usize {
        self.state.lock().access_requests
    }

    pub fn device_changes(&self) -> Vec<(String, DeviceChanges)> {
        self.state.lock().device_changes.clone()
    }

    pub fn is_recording(&self) -> bool {
        self.state.lock().recording.is_some()
    }

    /// Path of the movie file currently being written
    pub fn recording_path(&self) -> Option<PathBuf> {
        self.state.lock().recording.as_ref().map(|r| r.path.clone())
    }

    pub fn recording_settings(&self) -> Option<RecordingSettings> {
        let state = self.state.lock();
        state
            .recording
            .as_ref()
            .map(|r| r.settings.clone())
            .or_else(|| state.last_recording_settings.clone())
    }

    pub fn recordings_started(&self) -> usize {
        self.state.lock().recordings_started
    }

    pub fn saved_assets(&self) -> Vec<PathBuf> {
        self.state.lock().saved_assets.clone()
    }

    pub fn background_tasks_begun(&self) -> Vec<BackgroundTaskId> {
        self.state.lock().tasks_begun.clone()
    }

    pub fn background_tasks_ended(&self) -> Vec<BackgroundTaskId> {
        self.state.lock().tasks_ended.clone()
    }

    pub fn preview_orientation(&self) -> Option<VideoOrientation> {
        self.state.lock().preview_orientation
    }
}
