use crate::session::{CaptureSessionController, EventReceiver, UiState};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Controller driven by the remote UI
    pub controller: CaptureSessionController,

    /// Enablement flags folded from the controller's events
    pub ui: Arc<RwLock<UiState>>,
}

impl AppState {
    /// Wrap a controller and start folding its events into `ui`
    pub fn new(controller: CaptureSessionController, mut events: EventReceiver) -> Self {
        let ui = Arc::new(RwLock::new(UiState::default()));

        let folded = Arc::clone(&ui);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                folded.write().await.apply(&event);
            }
            debug!("Controller event stream ended");
        });

        Self { controller, ui }
    }
}
