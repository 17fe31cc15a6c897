use serde::{Deserialize, Serialize};

/// Physical position of a camera on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Front,
    Back,
    Unspecified,
}

/// Kind of built-in camera module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Ultra wide + wide pair
    DualWide,
    /// Wide + telephoto pair
    Dual,
    WideAngle,
    /// Front depth-sensing camera
    TrueDepth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusMode {
    Locked,
    AutoFocus,
    ContinuousAutoFocus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureMode {
    Locked,
    AutoExpose,
    ContinuousAutoExposure,
}

/// Point of interest in normalized device coordinates (0.0..=1.0 on both axes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const CENTER: Point = Point { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Inclusive frame rate range in frames per second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRateRange {
    pub min_fps: u32,
    pub max_fps: u32,
}

impl FrameRateRange {
    pub fn new(min_fps: u32, max_fps: u32) -> Self {
        Self { min_fps, max_fps }
    }

    pub fn contains(&self, other: &FrameRateRange) -> bool {
        self.min_fps <= other.min_fps && other.max_fps <= self.max_fps
    }
}

/// Hardware capabilities reported for a camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    /// Whether the device's video connection supports stabilization
    pub supports_stabilization: bool,

    pub focus_point_supported: bool,
    pub focus_modes: Vec<FocusMode>,

    pub exposure_point_supported: bool,
    pub exposure_modes: Vec<ExposureMode>,

    /// Range of frame rates the active format can run at
    pub frame_rate_range: FrameRateRange,
}

impl DeviceCapabilities {
    pub fn supports_focus_mode(&self, mode: FocusMode) -> bool {
        self.focus_modes.contains(&mode)
    }

    pub fn supports_exposure_mode(&self, mode: ExposureMode) -> bool {
        self.exposure_modes.contains(&mode)
    }
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            supports_stabilization: true,
            focus_point_supported: true,
            focus_modes: vec![
                FocusMode::Locked,
                FocusMode::AutoFocus,
                FocusMode::ContinuousAutoFocus,
            ],
            exposure_point_supported: true,
            exposure_modes: vec![
                ExposureMode::Locked,
                ExposureMode::AutoExpose,
                ExposureMode::ContinuousAutoExposure,
            ],
            frame_rate_range: FrameRateRange::new(1, 60),
        }
    }
}

/// A camera discoverable on the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureDevice {
    /// Stable platform identifier
    pub id: String,
    pub device_type: DeviceType,
    pub position: Position,
    pub capabilities: DeviceCapabilities,
}

impl CaptureDevice {
    pub fn new(id: impl Into<String>, device_type: DeviceType, position: Position) -> Self {
        Self {
            id: id.into(),
            device_type,
            position,
            capabilities: DeviceCapabilities::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: DeviceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// A microphone discoverable on the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDevice {
    pub id: String,
}

/// Device settings applied while holding the device configuration lock
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceChanges {
    pub focus: Option<(FocusMode, Point)>,
    pub exposure: Option<(ExposureMode, Point)>,
    pub subject_area_monitoring: Option<bool>,
    pub frame_rate: Option<FrameRateRange>,
}
