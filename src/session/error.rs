use thiserror::Error;

use super::state::SessionConfigState;

/// Errors surfaced by the controller handle's awaited calls
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("session queue has shut down")]
    QueueClosed,

    #[error("session cannot run: {0:?}")]
    SessionUnavailable(SessionConfigState),
}
