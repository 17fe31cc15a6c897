//! Platform seams
//!
//! The controller reaches the operating system only through these traits:
//! - `CaptureBackend`: capture session, device discovery, movie output
//! - `PhotoLibrary`: destination for finished recordings
//! - `BackgroundTaskHost`: keeps recordings alive while backgrounded
//! - `WindowOrientation` / `PreviewSurface`: the UI's window and live preview
//!
//! `simulated` provides in-memory implementations of all of them.

pub mod backend;
pub mod services;
pub mod simulated;

pub use backend::{
    AuthorizationStatus, CaptureBackend, InterruptionReason, RecordingError, RecordingFinished,
    RecordingOutcome, RecordingSettings, SessionNotification, SessionPreset, SystemPressureLevel,
    VideoCodec,
};
pub use services::{
    BackgroundTaskHost, BackgroundTaskId, LibraryAuthorization, PhotoLibrary, Platform,
    PreviewSurface, WindowOrientation,
};
pub use simulated::{SimulatedConfig, SimulatedPlatform, SimulatedProbe};
