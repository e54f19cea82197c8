use crate::config::ConfigError;
use crate::tick::{FrameId, FramePhase};

/// Errors surfaced by [`FrameScheduler`](crate::FrameScheduler).
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The config failed validation; no loop was created.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    /// A hook panicked and the loop stopped.
    #[error("{phase} callback panicked on frame {frame_id}: {message}")]
    CallbackFailure {
        phase: FramePhase,
        frame_id: FrameId,
        message: String,
    },
    #[error("failed to spawn frame loop thread: {0}")]
    Spawn(#[source] std::io::Error),
}
