use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use super::backend::CaptureBackend;
use crate::device::{InterfaceOrientation, VideoOrientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryAuthorization {
    Authorized,
    Limited,
    Denied,
}

impl LibraryAuthorization {
    pub fn can_add(&self) -> bool {
        matches!(self, Self::Authorized | Self::Limited)
    }
}

/// Shared photo library finished recordings are saved into
#[async_trait::async_trait]
pub trait PhotoLibrary: Send + Sync {
    /// Request add-only access; prompts the user when undetermined
    async fn request_authorization(&self) -> LibraryAuthorization;

    /// Create a new video asset by moving `file` into the library
    async fn save_video(&self, file: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackgroundTaskId(pub u64);

/// Host service that keeps the process alive while a recording is written
pub trait BackgroundTaskHost: Send + Sync {
    /// `None` when the host does not support background execution
    fn begin_task(&self, name: &str) -> Option<BackgroundTaskId>;

    fn end_task(&self, id: BackgroundTaskId);
}

/// Host window the preview lives in
pub trait WindowOrientation: Send + Sync {
    fn interface_orientation(&self) -> InterfaceOrientation;
}

/// Live preview rendering the session output
pub trait PreviewSurface: Send + Sync {
    fn set_orientation(&self, orientation: VideoOrientation);
}

/// Everything the controller needs from the host platform
pub struct Platform {
    pub capture: Box<dyn CaptureBackend>,
    pub library: Arc<dyn PhotoLibrary>,
    pub background: Arc<dyn BackgroundTaskHost>,
    pub window: Arc<dyn WindowOrientation>,
    pub preview: Arc<dyn PreviewSurface>,
}
