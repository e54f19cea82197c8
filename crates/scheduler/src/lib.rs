//! Frame Scheduler: fixed-rate update/render dispatch on a background thread.
//!
//! # Invariants
//! - Per-frame budget is `1000 / frame_rate` whole milliseconds.
//! - Render never fires without an update in the same tick.
//! - Sleep length is measured from the loop's start, so cadence does not drift.
//! - At most one loop per scheduler; `start` and `stop` are idempotent.
//! - Stopping interrupts the inter-frame sleep; hooks are never interrupted.

mod config;
mod error;
mod handler;
mod scheduler;
mod stats;
mod stop;
mod tick;

pub use config::{ConfigError, MAX_FRAME_RATE, ScheduleConfig};
pub use error::SchedulerError;
pub use handler::{Callbacks, FrameHandler};
pub use scheduler::{FrameScheduler, SchedulerState};
pub use stats::{DebugOverlay, FrameStats, FrameTimer, STATS_WINDOW};
pub use stop::StopSignal;
pub use tick::{FrameId, FramePhase, FrameTick};

pub fn crate_info() -> &'static str {
    "cadence-scheduler v0.1.0"
}
