use thiserror::Error;

use crate::input::{EventKind, ListenTarget};

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Renderer backend failed: {0}")]
    Backend(String),
    #[error("Failed to attach {kind:?} listener to {target:?}: {reason}")]
    Listener {
        target: ListenTarget,
        kind: EventKind,
        reason: String,
    },
    #[error("Invalid scene options: {0}")]
    InvalidOptions(String),
}
