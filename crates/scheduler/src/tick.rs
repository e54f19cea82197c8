use std::fmt;
use std::time::Instant;

/// Identifier of one loop iteration.
///
/// Counts up from 1 and wraps from `i32::MAX` to `i32::MIN` instead of
/// overflowing, so a loop may run indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameId(pub i32);

impl FrameId {
    /// The id before the first tick of a loop.
    pub const ZERO: FrameId = FrameId(0);

    /// The id of the tick after this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Data handed to both hooks of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    pub frame_id: FrameId,
    /// Moment by which this frame's work should ideally be done
    /// (frame start plus the per-frame budget).
    pub expiration: Instant,
}

impl FrameTick {
    /// Time left until `expiration`, zero once it has passed.
    pub fn remaining(&self) -> std::time::Duration {
        self.expiration.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expiration
    }
}

/// Which hook a tick was being dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Updating,
    Rendering,
    DebugOverlay,
}

impl fmt::Display for FramePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FramePhase::Updating => "updating",
            FramePhase::Rendering => "rendering",
            FramePhase::DebugOverlay => "debug overlay",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_tick_is_one() {
        assert_eq!(FrameId::ZERO.next(), FrameId(1));
        assert_eq!(FrameId::default(), FrameId::ZERO);
    }

    #[test]
    fn frame_id_wraps_to_min() {
        assert_eq!(FrameId(i32::MAX).next(), FrameId(i32::MIN));
        assert_eq!(FrameId(i32::MIN).next(), FrameId(i32::MIN + 1));
        assert_eq!(FrameId(-1).next(), FrameId::ZERO);
    }

    #[test]
    fn tick_expiration() {
        let past = FrameTick {
            frame_id: FrameId(1),
            expiration: Instant::now(),
        };
        assert!(past.is_expired());
        assert_eq!(past.remaining(), Duration::ZERO);

        let future = FrameTick {
            frame_id: FrameId(2),
            expiration: Instant::now() + Duration::from_secs(60),
        };
        assert!(!future.is_expired());
        assert!(future.remaining() > Duration::from_secs(59));
    }

    #[test]
    fn display_formats() {
        assert_eq!(FrameId(42).to_string(), "#42");
        assert_eq!(FramePhase::Rendering.to_string(), "rendering");
    }
}
