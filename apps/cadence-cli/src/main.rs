use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use cadence_scheduler::{DebugOverlay, FrameHandler, FrameScheduler, FrameTick, ScheduleConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cadence-cli", about = "CLI tool for cadence frame scheduling")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Run a scheduler against a synthetic consumer and report its counters
    Run {
        /// Schedule config file (.yaml, .yml or .json); flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Target frame rate in frames per second
        #[arg(short, long, allow_negative_numbers = true)]
        fps: Option<i32>,
        /// Render skip threshold, fraction of the frame budget in [0, 1]
        #[arg(short, long, allow_negative_numbers = true)]
        threshold: Option<f32>,
        /// How long to run, in milliseconds
        #[arg(short, long, default_value = "1000")]
        duration_ms: u64,
        /// Simulated work per update, in milliseconds
        #[arg(long, default_value = "0")]
        update_load_ms: u64,
        /// Emit debug overlay lines after every rendered frame
        #[arg(long)]
        debug_overlay: bool,
    },
    /// Validate a schedule config file
    Check {
        /// Config file to validate
        path: PathBuf,
    },
}

/// Consumer that burns a fixed amount of time per update.
struct SyntheticLoad {
    update_load: Duration,
}

impl FrameHandler for SyntheticLoad {
    fn on_updating(&mut self, tick: FrameTick) {
        if !self.update_load.is_zero() {
            std::thread::sleep(self.update_load);
        }
        tracing::trace!(frame = %tick.frame_id, "updated");
    }

    fn on_rendering(&mut self, tick: FrameTick) {
        tracing::trace!(
            frame = %tick.frame_id,
            remaining_us = tick.remaining().as_micros() as u64,
            "rendered"
        );
    }

    fn on_debug_overlay(&mut self, _tick: FrameTick, overlay: &DebugOverlay) {
        tracing::debug!(overlay = %overlay.lines().join(" | "), "debug overlay");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("cadence-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scheduler: {}", cadence_scheduler::crate_info());
            println!("default schedule: {} fps", ScheduleConfig::default().frame_rate);
        }
        Commands::Run {
            config,
            fps,
            threshold,
            duration_ms,
            update_load_ms,
            debug_overlay,
        } => {
            let mut schedule = match config {
                Some(path) => ScheduleConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => ScheduleConfig::default(),
            };
            if let Some(fps) = fps {
                schedule.frame_rate = fps;
            }
            if let Some(threshold) = threshold {
                schedule.render_skip_threshold = threshold;
            }
            schedule.debug_overlay_enabled |= debug_overlay;

            let handler = SyntheticLoad {
                update_load: Duration::from_millis(update_load_ms),
            };
            let scheduler = FrameScheduler::new(schedule, handler)?;

            println!(
                "Running at {} fps (budget {} ms, render skip threshold {}) for {duration_ms} ms",
                schedule.frame_rate,
                schedule.millis_per_frame(),
                schedule.render_skip_threshold
            );

            scheduler.start()?;
            std::thread::sleep(Duration::from_millis(duration_ms));
            scheduler.stop_and_wait();

            if let Some(err) = scheduler.take_failure() {
                return Err(err.into());
            }

            let stats = scheduler.stats();
            println!("Updates: {}", stats.updates);
            println!("Renders: {}", stats.renders);
            println!("Skipped renders: {}", stats.skipped_renders);
            println!(
                "Update time: avg={:?} max={:?}",
                stats.update_time.average(),
                stats.update_time.max()
            );
            println!("Measured frame rate: {:.1} fps", stats.measured_frame_rate());
        }
        Commands::Check { path } => {
            let schedule = ScheduleConfig::load(&path)
                .with_context(|| format!("invalid schedule config {}", path.display()))?;
            println!("{}: OK", path.display());
            println!("  frame_rate: {}", schedule.frame_rate);
            println!("  budget: {} ms", schedule.millis_per_frame());
            println!("  render_skip_threshold: {}", schedule.render_skip_threshold);
            println!("  debug_overlay_enabled: {}", schedule.debug_overlay_enabled);
        }
    }

    Ok(())
}
