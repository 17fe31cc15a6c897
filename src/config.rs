use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::device::FrameRateRange;
use crate::platform::SessionPreset;
use crate::session::ControllerConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub capture: CaptureConfig,
    pub library: LibraryConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    pub temp_dir: String,
    pub preset: SessionPreset,
    pub prefer_hevc: bool,
    pub throttled_min_fps: u32,
    pub throttled_max_fps: u32,
    pub background_task_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LibraryConfig {
    pub path: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            temp_dir: expand_path(&self.capture.temp_dir),
            preset: self.capture.preset,
            prefer_hevc: self.capture.prefer_hevc,
            throttled_frame_rate: FrameRateRange::new(
                self.capture.throttled_min_fps,
                self.capture.throttled_max_fps,
            ),
            background_task_name: self.capture.background_task_name.clone(),
        }
    }

    pub fn library_path(&self) -> PathBuf {
        expand_path(&self.library.path)
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
