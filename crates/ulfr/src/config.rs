//! Application settings.
//!
//! [`AppConfig`] can be built in code or loaded from JSON. Missing fields
//! take their defaults:
//!
//! ```json
//! {
//!     "name": "asteroids",
//!     "tick_rate": 0.02,
//!     "max_ticks_per_frame": 5
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::time::DEFAULT_TICK_RATE;

/// Shortest accepted Tick step: one microsecond.
pub const MIN_TICK_RATE: f64 = 1e-6;

/// Settings read by [`App`](crate::App) when it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name of the application, also used for the initial scene.
    pub name: String,
    /// Fixed step length of the Tick phase, in seconds.
    pub tick_rate: f64,
    /// When set, every iteration advances time by this many seconds instead
    /// of measuring the wall clock.
    pub frame_delta: Option<f64>,
    /// When set, at most this many Tick runs happen per iteration. Whole ticks
    /// beyond the cap are dropped; the sub-tick remainder is kept.
    pub max_ticks_per_frame: Option<u32>,
    /// Register a [`ConsoleLogger`](crate::logger::ConsoleLogger) sink on the
    /// context's logger.
    pub console_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "ulfr".to_string(),
            tick_rate: DEFAULT_TICK_RATE,
            frame_delta: None,
            max_ticks_per_frame: None,
            console_logging: true,
        }
    }
}

impl AppConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed JSON or out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that time values fit in a [`Duration`], the tick rate is at
    /// least [`MIN_TICK_RATE`] and the tick cap is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max_secs = Duration::MAX.as_secs_f64();
        if !(self.tick_rate >= MIN_TICK_RATE && self.tick_rate < max_secs) {
            return Err(ConfigError::InvalidTickRate(self.tick_rate));
        }
        if let Some(delta) = self.frame_delta {
            if !(delta > 0.0 && delta < max_secs) {
                return Err(ConfigError::InvalidFrameDelta(delta));
            }
        }
        if self.max_ticks_per_frame == Some(0) {
            return Err(ConfigError::InvalidMaxTicks);
        }
        Ok(())
    }

    pub fn with_tick_rate(mut self, seconds: f64) -> Self {
        self.tick_rate = seconds;
        self
    }

    /// Ticks per second, converted to [`tick_rate`](Self::tick_rate).
    pub fn with_tick_hz(self, hz: f64) -> Self {
        self.with_tick_rate(1.0 / hz)
    }

    pub fn with_frame_delta(mut self, seconds: f64) -> Self {
        self.frame_delta = Some(seconds);
        self
    }

    pub fn with_max_ticks_per_frame(mut self, max: u32) -> Self {
        self.max_ticks_per_frame = Some(max);
        self
    }

    pub fn with_console_logging(mut self, enabled: bool) -> Self {
        self.console_logging = enabled;
        self
    }
}
