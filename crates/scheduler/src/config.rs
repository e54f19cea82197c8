use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Highest accepted frame rate. Above this the per-frame budget truncates to 0 ms.
pub const MAX_FRAME_RATE: i32 = 1000;

/// Errors from building, loading, or validating a [`ScheduleConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("frame rate must be between 1 and 1000 fps, got {0}")]
    InvalidFrameRate(i32),
    #[error("render skip threshold must be between 0 and 1, got {0}")]
    InvalidRenderSkipThreshold(f32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
}

/// Scheduling configuration: target rate, render skip policy, debug overlay.
///
/// Values are only checked by [`ScheduleConfig::validate`], which every
/// scheduler constructor runs before a loop can exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Target frames per second.
    pub frame_rate: i32,
    /// Fraction of the per-frame budget the update phase may consume before
    /// the render for that frame is skipped.
    #[serde(default = "default_render_skip_threshold")]
    pub render_skip_threshold: f32,
    /// Dispatch `on_debug_overlay` after every rendered frame.
    #[serde(default)]
    pub debug_overlay_enabled: bool,
}

fn default_render_skip_threshold() -> f32 {
    1.0
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            render_skip_threshold: default_render_skip_threshold(),
            debug_overlay_enabled: false,
        }
    }
}

impl ScheduleConfig {
    /// Config for `frame_rate` with the default threshold and no overlay.
    pub fn new(frame_rate: i32) -> Self {
        Self {
            frame_rate,
            ..Default::default()
        }
    }

    pub fn with_render_skip_threshold(mut self, threshold: f32) -> Self {
        self.render_skip_threshold = threshold;
        self
    }

    pub fn with_debug_overlay(mut self, enabled: bool) -> Self {
        self.debug_overlay_enabled = enabled;
        self
    }

    /// Check the invariants the frame loop depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate <= 0 || self.frame_rate > MAX_FRAME_RATE {
            return Err(ConfigError::InvalidFrameRate(self.frame_rate));
        }
        // Negated range check so NaN is rejected too.
        if !(0.0..=1.0).contains(&self.render_skip_threshold) {
            return Err(ConfigError::InvalidRenderSkipThreshold(
                self.render_skip_threshold,
            ));
        }
        Ok(())
    }

    /// Per-frame budget in whole milliseconds (`1000 / frame_rate`, truncated).
    ///
    /// Only meaningful on a validated config.
    pub fn millis_per_frame(&self) -> u64 {
        1000 / self.frame_rate.max(1) as u64
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.millis_per_frame())
    }

    /// Whether an update phase of `update` leaves room to render this frame.
    ///
    /// Both limits are inclusive: the update must fit the whole budget and the
    /// thresholded share of it.
    pub fn allows_render(&self, update: Duration) -> bool {
        let budget_ms = self.millis_per_frame() as f64;
        let update_ms = update.as_nanos() as f64 / 1_000_000.0;
        update_ms <= budget_ms && update_ms <= self.render_skip_threshold as f64 * budget_ms
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let text = std::fs::read_to_string(path)?;
        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text),
            "json" => Self::from_json_str(&text),
            _ => Err(ConfigError::UnsupportedFormat(ext)),
        }
    }
}
