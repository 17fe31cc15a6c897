//! Camera model and discovery
//!
//! Types describing the cameras a platform reports, their capabilities, and
//! the prioritized selection used when configuring or switching cameras.

mod discovery;
mod orientation;
mod types;

pub use discovery::DiscoverySession;
pub use orientation::{InterfaceOrientation, VideoOrientation};
pub use types::{
    AudioDevice, CaptureDevice, DeviceCapabilities, DeviceChanges, DeviceType, ExposureMode,
    FocusMode, FrameRateRange, Point, Position,
};
