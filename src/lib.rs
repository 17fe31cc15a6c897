pub mod config;
pub mod device;
pub mod http;
pub mod platform;
pub mod session;

pub use config::Config;
pub use device::{
    CaptureDevice, DeviceType, DiscoverySession, ExposureMode, FocusMode, InterfaceOrientation,
    Point, Position, VideoOrientation,
};
pub use http::{create_router, AppState};
pub use platform::{Platform, SessionNotification, SimulatedConfig, SimulatedPlatform, SimulatedProbe};
pub use session::{
    AuthorizationState, CaptureSessionController, ControllerConfig, ControllerError,
    ControllerEvent, ControllerSnapshot, SessionConfigState, UiState,
};
