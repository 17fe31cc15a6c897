// Resources held for the lifetime of one recording
//
// - PendingRecordingFile: uniquely named temporary movie path, removed on cleanup
// - BackgroundTaskGuard: background execution held while the movie is written
//
// Both release exactly once: explicitly on the normal path, or on drop when a
// recording is abandoned early.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::platform::{BackgroundTaskHost, BackgroundTaskId, RecordingFinished};

const MOVIE_EXTENSION: &str = "mov";

/// Temporary file a single recording is written to
#[derive(Debug)]
pub struct PendingRecordingFile {
    path: PathBuf,
    cleaned: bool,
}

impl PendingRecordingFile {
    /// Fresh path under `dir`; never reused across recordings
    pub fn new(dir: &Path) -> Self {
        let path = dir.join(format!("{}.{}", uuid::Uuid::new_v4(), MOVIE_EXTENSION));
        Self { path, cleaned: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file if it is still in temporary storage
    ///
    /// Returns whether a file was removed. A file already moved into the
    /// photo library is left alone.
    pub fn cleanup(mut self) -> bool {
        self.remove()
    }

    fn remove(&mut self) -> bool {
        if self.cleaned {
            return false;
        }
        self.cleaned = true;

        if !self.path.exists() {
            return false;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed temporary movie file: {:?}", self.path);
                true
            }
            Err(e) => {
                warn!("Could not remove temporary movie file {:?}: {}", self.path, e);
                false
            }
        }
    }
}

impl Drop for PendingRecordingFile {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Background execution held while a recording is in flight
pub struct BackgroundTaskGuard {
    host: Arc<dyn BackgroundTaskHost>,
    id: Option<BackgroundTaskId>,
}

impl BackgroundTaskGuard {
    pub fn begin(host: Arc<dyn BackgroundTaskHost>, name: &str) -> Self {
        let id = host.begin_task(name);
        if id.is_none() {
            debug!("Background tasks unsupported, recording without one");
        }
        Self { host, id }
    }

    pub fn id(&self) -> Option<BackgroundTaskId> {
        self.id
    }

    pub fn end(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.host.end_task(id);
        }
    }
}

impl Drop for BackgroundTaskGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// A recording the movie output has acknowledged
pub(crate) struct ActiveRecording {
    pub file: PendingRecordingFile,
    pub background_task: BackgroundTaskGuard,
    pub finished: RecordingFinished,
    pub started_at: DateTime<Utc>,
    pub stop_requested: bool,
}
