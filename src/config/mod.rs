//! Configuration module for pointer-replay
//!
//! A [`Config`] is an explicit, immutable value: the binary loads it once and
//! hands each component its own section at construction time.
//!
//! # Sources
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`pointer-replay.toml` by default)
//! 3. Environment overrides:
//!    - `POINTER_REPLAY_DEBUG=true` forces the debug log level
//!    - `POINTER_REPLAY_LOG_LEVEL=<filter>` sets the log level
//!    - `POINTER_REPLAY_EXCHANGE_DIR=<path>` moves the exchange directory
//!
//! # Example
//!
//! ```ignore
//! use pointer_replay::config::Config;
//!
//! let config = Config::load_or_default(Some("pointer-replay.toml".as_ref()));
//! let player = TrajectoryPlayer::new(trajectory, config.playback.clone(), clock);
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{Result, TrajectoryError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration filename
pub const CONFIG_FILE: &str = "pointer-replay.toml";

/// Environment variable forcing debug logging
pub const ENV_DEBUG: &str = "POINTER_REPLAY_DEBUG";

/// Environment variable setting the log level
pub const ENV_LOG_LEVEL: &str = "POINTER_REPLAY_LOG_LEVEL";

/// Environment variable setting the exchange directory
pub const ENV_EXCHANGE_DIR: &str = "POINTER_REPLAY_EXCHANGE_DIR";

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureSettings,
    pub playback: PlaybackSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| TrajectoryError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TrajectoryError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` (if given and present) and apply environment
    /// overrides, falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let mut config = match path {
            Some(path) if path.exists() => Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }),
            _ => Self::default(),
        };
        config.apply_env();
        config
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup(ENV_DEBUG).is_some_and(|v| v.eq_ignore_ascii_case("true")) {
            self.logging.debug = true;
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
            self.logging.level = level;
        }

        if let Some(dir) = lookup(ENV_EXCHANGE_DIR).filter(|v| !v.is_empty()) {
            self.storage.exchange_dir = PathBuf::from(dir);
        }
    }

    /// Check that the configuration can drive the components
    pub fn validate(&self) -> Result<()> {
        if self.capture.min_points < MIN_TRAJECTORY_POINTS {
            return Err(TrajectoryError::Config(format!(
                "capture.min_points must be at least {}",
                MIN_TRAJECTORY_POINTS
            )));
        }

        if self.capture.target_radius <= 0.0 {
            return Err(TrajectoryError::Config(
                "capture.target_radius must be positive".to_string(),
            ));
        }

        if self.playback.trail_capacity == 0 {
            return Err(TrajectoryError::Config(
                "playback.trail_capacity must be positive".to_string(),
            ));
        }

        let playback = &self.playback;
        if !(playback.min_speed > 0.0 && playback.min_speed <= playback.max_speed) {
            return Err(TrajectoryError::Config(format!(
                "playback speed bounds are invalid: min={} max={}",
                playback.min_speed, playback.max_speed
            )));
        }

        if playback.speed_options.is_empty()
            || playback
                .speed_options
                .iter()
                .any(|s| !s.is_finite() || *s <= 0.0)
        {
            return Err(TrajectoryError::Config(
                "playback.speed_options must be non-empty and positive".to_string(),
            ));
        }

        if playback.default_speed_index >= playback.speed_options.len() {
            return Err(TrajectoryError::Config(format!(
                "playback.default_speed_index {} is out of range",
                playback.default_speed_index
            )));
        }

        if playback.frame_rate == 0 {
            return Err(TrajectoryError::Config(
                "playback.frame_rate must be positive".to_string(),
            ));
        }

        if self.storage.fingerprint_len == 0 || self.storage.fingerprint_len > 8 {
            return Err(TrajectoryError::Config(
                "storage.fingerprint_len must be between 1 and 8".to_string(),
            ));
        }

        Ok(())
    }

    /// Serialize to TOML (used to write a starter config)
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TrajectoryError::Serialization(format!("Failed to serialize config: {}", e)))
    }
}
