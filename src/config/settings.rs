//! Per-component configuration sections
//!
//! Each component receives its own section by value at construction time.
//! Nothing in the crate reads configuration from ambient global state.
//!
//! # Main Types
//!
//! - [`CaptureSettings`] - Recorder limits and capture target zones
//! - [`PlaybackSettings`] - Trail size, speed steps and speed bounds
//! - [`StorageSettings`] - Exchange directory, fingerprint width, size limits
//! - [`LoggingSettings`] - Log level and optional rolling log directory

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default maximum number of samples kept per capture session
pub const DEFAULT_MAX_POINTS: usize = 10_000;

/// Minimum number of samples for a meaningful trajectory
pub const MIN_TRAJECTORY_POINTS: usize = 2;

/// Default trail capacity (rendered positions kept for feedback)
pub const DEFAULT_TRAIL_CAPACITY: usize = 100;

/// Default playback speed steps
pub const DEFAULT_SPEED_OPTIONS: [f64; 5] = [0.25, 0.5, 1.0, 2.0, 4.0];

/// Default directory shared by capture producers and playback consumers
pub const DEFAULT_EXCHANGE_DIR: &str = "csv_data";

/// Settings for the capture side (recorder + capture controller)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Samples beyond this count are dropped (0 = unlimited)
    pub max_points: usize,

    /// Fewer samples than this at finish is a collection error
    pub min_points: usize,

    /// Radius of the start/end target circles in pixels
    pub target_radius: f64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            min_points: MIN_TRAJECTORY_POINTS,
            target_radius: 15.0,
        }
    }
}

/// Settings for playback (clock, player and trail)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Number of rendered positions kept in the trail
    pub trail_capacity: usize,

    /// Discrete speed steps used by speed up / speed down
    pub speed_options: Vec<f64>,

    /// Index into `speed_options` used when a player is created
    pub default_speed_index: usize,

    /// Lower bound for any speed multiplier
    pub min_speed: f64,

    /// Upper bound for any speed multiplier
    pub max_speed: f64,

    /// Host frame rate used by the headless replay loop
    pub frame_rate: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            trail_capacity: DEFAULT_TRAIL_CAPACITY,
            speed_options: DEFAULT_SPEED_OPTIONS.to_vec(),
            default_speed_index: 2,
            min_speed: 0.1,
            max_speed: 10.0,
            frame_rate: 60,
        }
    }
}

impl PlaybackSettings {
    /// Speed multiplier a fresh player starts with
    pub fn default_speed(&self) -> f64 {
        self.speed_options
            .get(self.default_speed_index)
            .copied()
            .unwrap_or(1.0)
    }

    /// Clamp a requested multiplier into the configured bounds
    pub fn clamp_speed(&self, speed: f64) -> f64 {
        speed.max(self.min_speed).min(self.max_speed)
    }
}

/// Settings for the persisted artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Shared exchange directory
    pub exchange_dir: PathBuf,

    /// Width of the hex fingerprint in artifact names
    pub fingerprint_len: usize,

    /// Row files larger than this are refused on load
    pub max_file_size_mb: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            exchange_dir: PathBuf::from(DEFAULT_EXCHANGE_DIR),
            fingerprint_len: 8,
            max_file_size_mb: 50,
        }
    }
}

impl StorageSettings {
    /// Size limit in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Settings for the binary's tracing subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,

    /// Forces the debug level regardless of `level`
    pub debug: bool,

    /// When set, logs are also written to a daily rolling file here
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug: false,
            log_dir: None,
        }
    }
}

impl LoggingSettings {
    /// Level actually handed to the env filter
    pub fn effective_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.level
        }
    }
}
