use crate::stats::DebugOverlay;
use crate::tick::FrameTick;

/// Consumer of scheduler ticks.
///
/// Hooks run synchronously on the loop thread, so their duration counts
/// against the frame budget. `on_rendering` receives the same tick as the
/// preceding `on_updating` and is skipped when the update overran.
pub trait FrameHandler {
    /// Advance simulation/game state for this tick.
    fn on_updating(&mut self, tick: FrameTick);

    /// Produce output for this tick.
    fn on_rendering(&mut self, tick: FrameTick);

    /// Called after `on_rendering` when the debug overlay is enabled.
    fn on_debug_overlay(&mut self, tick: FrameTick, overlay: &DebugOverlay) {
        let _ = (tick, overlay);
    }
}

/// A [`FrameHandler`] built from a pair of closures.
pub struct Callbacks<U, R> {
    updating: U,
    rendering: R,
}

impl<U, R> Callbacks<U, R>
where
    U: FnMut(FrameTick),
    R: FnMut(FrameTick),
{
    pub fn new(updating: U, rendering: R) -> Self {
        Self {
            updating,
            rendering,
        }
    }
}

impl<U, R> FrameHandler for Callbacks<U, R>
where
    U: FnMut(FrameTick),
    R: FnMut(FrameTick),
{
    fn on_updating(&mut self, tick: FrameTick) {
        (self.updating)(tick)
    }

    fn on_rendering(&mut self, tick: FrameTick) {
        (self.rendering)(tick)
    }
}
