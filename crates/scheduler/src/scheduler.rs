use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::ScheduleConfig;
use crate::error::SchedulerError;
use crate::handler::FrameHandler;
use crate::stats::{DebugOverlay, FrameStats};
use crate::stop::StopSignal;
use crate::tick::{FrameId, FramePhase, FrameTick};

/// Lifecycle of a [`FrameScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// State shared between the scheduler and its loop thread.
#[derive(Debug, Default)]
struct Shared {
    /// Cancellation handle of the live loop. `Some` exactly while running.
    signal: Mutex<Option<Arc<StopSignal>>>,
    stats: Mutex<FrameStats>,
    failure: Mutex<Option<SchedulerError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fixed-rate driver of a [`FrameHandler`].
///
/// Each tick calls `on_updating`, then `on_rendering` unless the update ate
/// more than `render_skip_threshold` of the frame budget, then sleeps until
/// the next budget boundary measured from the loop's start. Ticks run on a
/// dedicated thread; `start` and `stop` may be called from any thread and
/// neither blocks on the loop.
///
/// A panic inside a hook stops the loop and is kept as a
/// [`SchedulerError::CallbackFailure`] for [`take_failure`](Self::take_failure).
pub struct FrameScheduler<H> {
    config: ScheduleConfig,
    handler: Arc<Mutex<H>>,
    shared: Arc<Shared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl<H> FrameScheduler<H>
where
    H: FrameHandler + Send + 'static,
{
    /// Validate `config` and build a stopped scheduler around `handler`.
    pub fn new(config: ScheduleConfig, handler: H) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self {
            config,
            handler: Arc::new(Mutex::new(handler)),
            shared: Arc::new(Shared::default()),
            thread: Mutex::new(None),
        })
    }

    /// Launch the frame loop. No-op while a loop is running, including one
    /// that has been asked to stop but has not exited yet.
    pub fn start(&self) -> Result<(), SchedulerError> {
        let previous = {
            let mut slot = lock(&self.shared.signal);
            if slot.is_some() {
                tracing::debug!("start ignored: frame loop already running");
                return Ok(());
            }

            let signal = Arc::new(StopSignal::new());
            *lock(&self.shared.stats) = FrameStats::new();
            let frame_loop = FrameLoop {
                config: self.config,
                handler: Arc::clone(&self.handler),
                shared: Arc::clone(&self.shared),
                signal: Arc::clone(&signal),
            };
            // The slot stays locked until the handle is stored, so the loop
            // cannot finish and clear it first.
            let handle = thread::Builder::new()
                .name("frame-scheduler".into())
                .spawn(move || frame_loop.run())
                .map_err(SchedulerError::Spawn)?;
            *slot = Some(signal);
            lock(&self.thread).replace(handle)
        };

        tracing::debug!(
            frame_rate = self.config.frame_rate,
            render_skip_threshold = self.config.render_skip_threshold,
            "frame loop started"
        );

        // A stored handle from an earlier run belongs to a loop that already
        // released its slot.
        if let Some(old) = previous
            && old.join().is_err()
        {
            tracing::warn!("previous frame loop thread panicked outside a hook");
        }
        Ok(())
    }

    /// Run `f` against the handler, waiting for any hook in progress.
    pub fn with_handler<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut *lock(&self.handler))
    }
}

impl<H> FrameScheduler<H> {
    /// Ask the loop to stop. Returns immediately; the loop exits at its next
    /// check, which interrupts the inter-frame sleep.
    pub fn stop(&self) {
        match lock(&self.shared.signal).as_ref() {
            Some(signal) => {
                signal.stop();
                tracing::debug!("frame loop stop requested");
            }
            None => tracing::debug!("stop ignored: frame loop not running"),
        }
    }

    /// Block until the most recently started loop has exited.
    ///
    /// Returns at once if called from inside a hook.
    pub fn wait(&self) {
        let mut slot = lock(&self.thread);
        let Some(handle) = slot.take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            *slot = Some(handle);
            return;
        }
        drop(slot);
        if handle.join().is_err() {
            tracing::warn!("frame loop thread panicked outside a hook");
        }
    }

    pub fn stop_and_wait(&self) {
        self.stop();
        self.wait();
    }

    pub fn state(&self) -> SchedulerState {
        if lock(&self.shared.signal).is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Snapshot of the current (or most recent) run's counters.
    pub fn stats(&self) -> FrameStats {
        lock(&self.shared.stats).clone()
    }

    /// The hook failure that ended the last run, if any. Cleared by reading.
    pub fn take_failure(&self) -> Option<SchedulerError> {
        lock(&self.shared.failure).take()
    }
}

impl<H> Drop for FrameScheduler<H> {
    fn drop(&mut self) {
        self.stop_and_wait();
    }
}

/// Everything the loop thread owns for one run.
struct FrameLoop<H> {
    config: ScheduleConfig,
    handler: Arc<Mutex<H>>,
    shared: Arc<Shared>,
    signal: Arc<StopSignal>,
}

impl<H: FrameHandler> FrameLoop<H> {
    fn run(self) {
        let _span = tracing::info_span!("frame_loop", frame_rate = self.config.frame_rate).entered();

        let outcome = self.ticks();

        if let Err(err) = outcome {
            tracing::error!(%err, "frame loop terminated by callback failure");
            *lock(&self.shared.failure) = Some(err);
        }

        // Read before releasing the slot; a restart resets the stats.
        let stats = lock(&self.shared.stats).clone();
        {
            let mut slot = lock(&self.shared.signal);
            if slot.as_ref().is_some_and(|s| Arc::ptr_eq(s, &self.signal)) {
                *slot = None;
            }
        }

        tracing::info!(
            updates = stats.updates,
            renders = stats.renders,
            skipped_renders = stats.skipped_renders,
            "frame loop stopped"
        );
    }

    fn ticks(&self) -> Result<(), SchedulerError> {
        let budget_ms = self.config.millis_per_frame();
        let budget = Duration::from_millis(budget_ms);
        let loop_start = Instant::now();
        let mut frame_id = FrameId::ZERO;

        while !self.signal.is_stopped() {
            frame_id = frame_id.next();
            let frame_start = Instant::now();
            let tick = FrameTick {
                frame_id,
                expiration: frame_start + budget,
            };

            self.dispatch(FramePhase::Updating, frame_id, |h| h.on_updating(tick))?;

            let after_update = Instant::now();
            let update = after_update.saturating_duration_since(frame_start);
            lock(&self.shared.stats).record_update(frame_id, update);

            if self.config.allows_render(update) {
                let rendered_at = Instant::now();
                self.dispatch(FramePhase::Rendering, frame_id, |h| h.on_rendering(tick))?;

                let overlay = {
                    let mut stats = lock(&self.shared.stats);
                    stats.record_render(rendered_at);
                    DebugOverlay {
                        frame_id,
                        elapsed: rendered_at.saturating_duration_since(loop_start),
                        target_frame_rate: self.config.frame_rate,
                        measured_frame_rate: stats.measured_frame_rate(),
                    }
                };
                if self.config.debug_overlay_enabled {
                    self.dispatch(FramePhase::DebugOverlay, frame_id, |h| {
                        h.on_debug_overlay(tick, &overlay)
                    })?;
                }
            } else {
                lock(&self.shared.stats).record_skip();
                tracing::trace!(
                    %frame_id,
                    update_us = update.as_micros() as u64,
                    budget_ms,
                    "render skipped"
                );
            }

            // Sleep to the next budget boundary counted from loop start, so
            // truncation and overshoot do not accumulate across ticks.
            let since_start = after_update.saturating_duration_since(loop_start);
            let phase = (since_start.as_millis() % u128::from(budget_ms)) as u64;
            if self.signal.wait_timeout(Duration::from_millis(budget_ms - phase)) {
                break;
            }
        }
        Ok(())
    }

    fn dispatch(
        &self,
        phase: FramePhase,
        frame_id: FrameId,
        hook: impl FnOnce(&mut H),
    ) -> Result<(), SchedulerError> {
        let mut handler = lock(&self.handler);
        panic::catch_unwind(AssertUnwindSafe(|| hook(&mut *handler))).map_err(|payload| {
            SchedulerError::CallbackFailure {
                phase,
                frame_id,
                message: panic_message(payload.as_ref()),
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
