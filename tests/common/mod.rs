// Shared harness for controller integration tests
//
// Spawns a controller on the simulated platform with temporary directories
// for in-flight recordings and the photo library.

#![allow(dead_code)]

use camcorder::session::EventReceiver;
use camcorder::{
    CaptureSessionController, ControllerConfig, ControllerEvent, ControllerSnapshot,
    SimulatedConfig, SimulatedPlatform, SimulatedProbe,
};
use std::path::PathBuf;
use tempfile::TempDir;

pub struct Harness {
    pub controller: CaptureSessionController,
    pub events: EventReceiver,
    pub probe: SimulatedProbe,
    pub temp_dir: TempDir,
    pub library_dir: TempDir,
}

impl Harness {
    /// Phone with front and back cameras, camera access already granted
    pub fn phone() -> Self {
        Self::with(|_| {})
    }

    pub fn with(customize: impl FnOnce(&mut SimulatedConfig)) -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let library_dir = TempDir::new().expect("library dir");

        let mut sim = SimulatedConfig::phone(library_dir.path());
        customize(&mut sim);

        let config = ControllerConfig {
            temp_dir: temp_dir.path().to_path_buf(),
            ..ControllerConfig::default()
        };

        let (platform, probe) = SimulatedPlatform::new(sim);
        let (controller, events) = CaptureSessionController::spawn(platform, config);

        Self {
            controller,
            events,
            probe,
            temp_dir,
            library_dir,
        }
    }

    /// Authorize, configure and start, then discard the startup events
    pub async fn running(customize: impl FnOnce(&mut SimulatedConfig)) -> Self {
        let mut harness = Self::with(customize);
        harness.controller.check_authorization();
        harness.controller.start_session();
        harness.drain().await;
        harness
    }

    /// Wait for the session queue to go idle and collect the events it produced
    pub async fn drain(&mut self) -> Vec<ControllerEvent> {
        self.controller.snapshot().await.expect("controller alive");
        self.pending_events()
    }

    /// Events already delivered, without waiting on the queue
    pub fn pending_events(&mut self) -> Vec<ControllerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        self.controller.snapshot().await.expect("controller alive")
    }

    /// Files left in the temporary recording directory
    pub fn temp_files(&self) -> Vec<PathBuf> {
        list_dir(&self.temp_dir)
    }

    pub fn library_files(&self) -> Vec<PathBuf> {
        list_dir(&self.library_dir)
    }
}

fn list_dir(dir: &TempDir) -> Vec<PathBuf> {
    std::fs::read_dir(dir.path())
        .expect("readable dir")
        .map(|entry| entry.expect("dir entry").path())
        .collect()
}
