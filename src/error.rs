//! Error types for the minigolf core.

use thiserror::Error;

use crate::sim::BodyKind;

#[derive(Debug, Error)]
pub enum MinigolfError {
    /// A host capability (visuals, timers) failed. The level cannot continue.
    #[error("collaborator failure: {0}")]
    CollaboratorFailure(String),

    #[error("body kind {0:?} has no construction data")]
    UnsupportedKind(BodyKind),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MinigolfError>;
