use std::time::{Duration, Instant};

use crate::tick::FrameId;

/// Number of samples kept by the rolling timers in [`FrameStats`].
pub const STATS_WINDOW: usize = 60;

/// Rolling window of the most recent durations.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    history: Vec<Duration>,
    index: usize,
    filled: bool,
}

impl FrameTimer {
    /// A timer remembering the last `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            history: vec![Duration::ZERO; capacity.max(1)],
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, sample: Duration) {
        self.history[self.index] = sample;
        self.index = (self.index + 1) % self.history.len();
        if self.index == 0 {
            self.filled = true;
        }
    }

    fn samples(&self) -> &[Duration] {
        &self.history[..self.count()]
    }

    pub fn count(&self) -> usize {
        if self.filled {
            self.history.len()
        } else {
            self.index
        }
    }

    /// Most recently recorded sample.
    pub fn last(&self) -> Option<Duration> {
        if self.count() == 0 {
            return None;
        }
        let len = self.history.len();
        Some(self.history[(self.index + len - 1) % len])
    }

    pub fn average(&self) -> Duration {
        let samples = self.samples();
        if samples.is_empty() {
            return Duration::ZERO;
        }
        samples.iter().sum::<Duration>() / samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.samples().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.samples().iter().copied().min().unwrap_or(Duration::ZERO)
    }
}

/// Counters and timings for the current (or last) loop run.
#[derive(Debug, Clone)]
pub struct FrameStats {
    pub updates: u64,
    pub renders: u64,
    /// Ticks whose render was suppressed because the update overran.
    pub skipped_renders: u64,
    pub last_frame_id: Option<FrameId>,
    /// Time spent in `on_updating`, per tick.
    pub update_time: FrameTimer,
    /// Time between consecutive rendered frames.
    pub render_interval: FrameTimer,
    last_render: Option<Instant>,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            updates: 0,
            renders: 0,
            skipped_renders: 0,
            last_frame_id: None,
            update_time: FrameTimer::new(STATS_WINDOW),
            render_interval: FrameTimer::new(STATS_WINDOW),
            last_render: None,
        }
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_update(&mut self, frame_id: FrameId, took: Duration) {
        self.updates += 1;
        self.last_frame_id = Some(frame_id);
        self.update_time.record(took);
    }

    pub(crate) fn record_render(&mut self, at: Instant) {
        self.renders += 1;
        if let Some(prev) = self.last_render {
            self.render_interval.record(at.saturating_duration_since(prev));
        }
        self.last_render = Some(at);
    }

    pub(crate) fn record_skip(&mut self) {
        self.skipped_renders += 1;
    }

    /// Rendered frames per second over the rolling window, 0 until two
    /// renders have happened.
    pub fn measured_frame_rate(&self) -> f64 {
        let avg = self.render_interval.average();
        if avg.is_zero() {
            return 0.0;
        }
        1.0 / avg.as_secs_f64()
    }
}

/// Diagnostics passed to `on_debug_overlay` after a rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugOverlay {
    pub frame_id: FrameId,
    /// Time since the loop started.
    pub elapsed: Duration,
    pub target_frame_rate: i32,
    pub measured_frame_rate: f64,
}

impl DebugOverlay {
    /// Overlay text, one entry per line, top to bottom.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("t+{:.3}s {}", self.elapsed.as_secs_f64(), self.frame_id),
            format!(
                "{:.0}fps (target {})",
                self.measured_frame_rate, self.target_frame_rate
            ),
        ]
    }
}
