use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::device::FrameRateRange;
use crate::platform::SessionPreset;

/// Configuration for a capture session controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Directory temporary movie files are written to
    pub temp_dir: PathBuf,

    /// Preset applied when configuring for movie capture
    pub preset: SessionPreset,

    /// Record with HEVC whenever the output offers it
    pub prefer_hevc: bool,

    /// Frame rate range applied under serious or critical system pressure
    pub throttled_frame_rate: FrameRateRange,

    /// Name given to the background task held during a recording
    pub background_task_name: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            preset: SessionPreset::High,
            prefer_hevc: true,
            throttled_frame_rate: FrameRateRange::new(15, 20),
            background_task_name: "movie-recording".to_string(),
        }
    }
}
