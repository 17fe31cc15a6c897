// Camera discovery and prioritized selection
//
// Cameras are never chosen by the user directly. The default camera and the
// camera used after a switch are both picked from fixed priority lists:
// - default: dual-wide back, dual back, wide-angle back, wide-angle front
// - switching to back: dual, dual-wide, wide-angle
// - switching to front: true-depth, wide-angle

use std::collections::HashSet;

use super::types::{CaptureDevice, DeviceType, Position};

const DEFAULT_PRIORITY: [(DeviceType, Position); 4] = [
    (DeviceType::DualWide, Position::Back),
    (DeviceType::Dual, Position::Back),
    (DeviceType::WideAngle, Position::Back),
    (DeviceType::WideAngle, Position::Front),
];

const BACK_PRIORITY: [DeviceType; 3] = [DeviceType::Dual, DeviceType::DualWide, DeviceType::WideAngle];

const FRONT_PRIORITY: [DeviceType; 2] = [DeviceType::TrueDepth, DeviceType::WideAngle];

/// Snapshot of the cameras the platform currently reports
#[derive(Debug, Clone, Default)]
pub struct DiscoverySession {
    devices: Vec<CaptureDevice>,
}

impl DiscoverySession {
    pub fn new(devices: Vec<CaptureDevice>) -> Self {
        Self { devices }
    }

    fn find(&self, device_type: DeviceType, position: Position) -> Option<&CaptureDevice> {
        self.devices
            .iter()
            .find(|d| d.device_type == device_type && d.position == position)
    }

    /// Camera bound when the session is first configured
    pub fn default_video_device(&self) -> Option<&CaptureDevice> {
        DEFAULT_PRIORITY
            .iter()
            .find_map(|&(device_type, position)| self.find(device_type, position))
    }

    /// Best camera on the side opposite to `current`
    ///
    /// Front and unspecified cameras switch to the back; back cameras switch
    /// to the front. Falls back to any camera at the target position when none
    /// of the preferred types exist.
    pub fn switch_target(&self, current: Position) -> Option<&CaptureDevice> {
        let (position, priority): (Position, &[DeviceType]) = match current {
            Position::Front | Position::Unspecified => (Position::Back, &BACK_PRIORITY),
            Position::Back => (Position::Front, &FRONT_PRIORITY),
        };

        priority
            .iter()
            .find_map(|&device_type| self.find(device_type, position))
            .or_else(|| self.devices.iter().find(|d| d.position == position))
    }

    /// Number of distinct positions among discoverable cameras
    pub fn unique_positions_count(&self) -> usize {
        self.devices
            .iter()
            .map(|d| d.position)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Camera switching only makes sense with cameras on more than one side
    pub fn can_switch(&self) -> bool {
        self.unique_positions_count() > 1
    }
}
