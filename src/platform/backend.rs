use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, oneshot};

use crate::device::{AudioDevice, CaptureDevice, DeviceChanges, VideoOrientation};

/// Camera authorization status reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

/// Session preset controlling output quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPreset {
    /// Highest quality suitable for movie capture
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    Hevc,
    H264,
}

/// Settings applied to the movie output connection for one recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub orientation: VideoOrientation,
    /// `None` keeps the platform's default codec
    pub codec: Option<VideoCodec>,
}

/// Error reported by the movie output when a recording ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingError {
    pub message: String,

    /// Set when the file was still written completely, e.g. a recording that
    /// stopped because it reached a maximum duration or file size
    pub finished_successfully: bool,
}

/// Result of a recording as reported by the movie output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingOutcome {
    pub output_path: PathBuf,
    pub error: Option<RecordingError>,
}

impl RecordingOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.as_ref().map_or(true, |e| e.finished_successfully)
    }
}

/// Resolves once the movie output finishes writing the current recording
pub type RecordingFinished = oneshot::Receiver<RecordingOutcome>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPressureLevel {
    Nominal,
    Fair,
    Serious,
    Critical,
    Shutdown,
}

/// Why the platform interrupted a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionReason {
    VideoDeviceNotAvailableInBackground,
    AudioDeviceInUseByAnotherClient,
    VideoDeviceInUseByAnotherClient,
    VideoDeviceNotAvailableWithMultipleForegroundApps,
    VideoDeviceNotAvailableDueToSystemPressure,
}

/// Change notifications delivered to registered session observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionNotification {
    RunningChanged { running: bool },
    SystemPressureChanged { device_id: String, level: SystemPressureLevel },
    RuntimeError { media_services_reset: bool, message: String },
    Interrupted { reason: InterruptionReason },
    InterruptionEnded,
    SubjectAreaChanged { device_id: String },
}

/// Platform capture session backend
///
/// Implementations wrap the platform's capture session together with its
/// device discovery and movie file output. The controller is the only owner of
/// a backend and calls it from a single task, so implementations need no
/// internal synchronization for session mutations.
///
/// Topology mutations (`set_preset`, `add_*`, `remove_video_input`,
/// `set_stabilization`) are only issued between `begin_configuration` and
/// `commit_configuration`.
#[async_trait::async_trait]
pub trait CaptureBackend: Send {
    /// Backend name for logging
    fn name(&self) -> &str;

    fn authorization_status(&self) -> AuthorizationStatus;

    /// Prompt the user for camera access; resolves with the decision
    async fn request_access(&mut self) -> bool;

    /// Cameras currently discoverable
    fn video_devices(&self) -> Vec<CaptureDevice>;

    fn default_audio_device(&self) -> Option<AudioDevice>;

    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    fn set_preset(&mut self, preset: SessionPreset) -> Result<()>;

    /// Create an input for `device` and add it to the session
    fn add_video_input(&mut self, device: &CaptureDevice) -> Result<()>;

    fn remove_video_input(&mut self, device: &CaptureDevice);

    fn add_audio_input(&mut self, device: &AudioDevice) -> Result<()>;

    fn add_movie_output(&mut self) -> Result<()>;

    /// Toggle automatic stabilization on the movie output's video connection
    fn set_stabilization(&mut self, enabled: bool) -> Result<()>;

    /// Lock `device` for configuration, apply `changes`, unlock
    fn apply_device_changes(&mut self, device: &CaptureDevice, changes: &DeviceChanges) -> Result<()>;

    async fn start_running(&mut self) -> Result<()>;

    async fn stop_running(&mut self) -> Result<()>;

    fn is_running(&self) -> bool;

    /// Register a session observer
    ///
    /// Notifications flow until the returned receiver is dropped.
    fn observe(&mut self) -> mpsc::UnboundedReceiver<SessionNotification>;

    /// Codecs the movie output can encode with for the next recording
    fn available_codecs(&self) -> Vec<VideoCodec>;

    /// Start writing a movie to `path`
    ///
    /// Returns once the output acknowledges the start.
    fn start_recording(&mut self, path: &Path, settings: &RecordingSettings) -> Result<RecordingFinished>;

    /// Request the output to stop; completion arrives on the `RecordingFinished` receiver
    fn stop_recording(&mut self) -> Result<()>;
}
