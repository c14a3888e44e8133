//! Core data types for pointer-replay
//!
//! # Main Types
//!
//! - [`Point`] - A 2D pointer position in pixels
//! - [`Sample`] - One recorded observation: position plus delay since the previous one
//! - [`Trajectory`] - Immutable ordered samples with derived cumulative timestamps
//! - [`TrajectoryMetadata`] - Derived statistics persisted next to a trajectory
//!
//! # Timing
//!
//! Samples store `dt`, the delay since the previous sample, never absolute
//! time. The first sample's `dt` is 0. Cumulative timestamps are derived once
//! when a [`Trajectory`] is built: `cum[0] = 0`, `cum[i] = cum[i-1] + dt[i]`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MIN_TRAJECTORY_POINTS;
use crate::error::{Result, TrajectoryError};

/// Metadata key holding the position passed to `start_capture`
pub const CAPTURE_ORIGIN_KEY: &str = "capture_origin";

/// Metadata key holding the position passed to `finish_capture`
pub const CAPTURE_END_KEY: &str = "capture_end";

/// A 2D pointer position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation towards `other`
    ///
    /// `t` is clamped to [0, 1]; the endpoints are returned exactly so a
    /// clamped result never drifts off a recorded sample.
    pub fn lerp(self, other: Point, t: f64) -> Point {
        if t <= 0.0 {
            return self;
        }
        if t >= 1.0 {
            return other;
        }
        Point {
            x: self.x + t * (other.x - self.x),
            y: self.y + t * (other.y - self.y),
        }
    }

    /// Whether this point lies within `radius` of `center`
    pub fn is_within(&self, center: &Point, radius: f64) -> bool {
        self.distance(center) <= radius
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// One recorded observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    /// Seconds elapsed since the previous sample (0 for the first one)
    pub dt: f64,
}

impl Sample {
    pub fn new(position: Point, dt: f64) -> Self {
        Self {
            x: position.x,
            y: position.y,
            dt,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Derived statistics persisted alongside a trajectory
///
/// `custom` carries passthrough fields: anything in a sidecar that is not one
/// of the known keys survives a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryMetadata {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Seconds between the first and last sample
    pub duration: f64,
    /// Path length in pixels
    pub total_distance: f64,
    /// Pixels per second, 0 when the duration is 0
    pub average_speed: f64,
    pub point_count: usize,
    #[serde(flatten)]
    pub custom: serde_json::Map<String, serde_json::Value>,
}

impl TrajectoryMetadata {
    /// Compute metadata from samples, anchoring the wall-clock range at `start_time`
    pub fn from_samples(samples: &[Sample], start_time: DateTime<Utc>) -> Self {
        let duration: f64 = samples.iter().skip(1).map(|s| s.dt).sum();
        let total_distance = path_length(samples);
        let average_speed = if duration > 0.0 {
            total_distance / duration
        } else {
            0.0
        };

        Self {
            start_time,
            end_time: start_time + seconds_to_delta(duration),
            duration,
            total_distance,
            average_speed,
            point_count: samples.len(),
            custom: serde_json::Map::new(),
        }
    }

    /// Read a passthrough point stored under `key`
    pub fn custom_point(&self, key: &str) -> Option<Point> {
        self.custom
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// An immutable recorded (or generated) pointer path
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    samples: Vec<Sample>,
    cumulative: Vec<f64>,
    metadata: TrajectoryMetadata,
}

impl Trajectory {
    /// Build a trajectory whose metadata is computed from the samples
    pub fn new(samples: Vec<Sample>, start_time: DateTime<Utc>) -> Result<Self> {
        let metadata = TrajectoryMetadata::from_samples(&samples, start_time);
        Self::with_metadata(samples, metadata)
    }

    /// Build a trajectory with externally supplied metadata (e.g. a sidecar)
    pub fn with_metadata(mut samples: Vec<Sample>, metadata: TrajectoryMetadata) -> Result<Self> {
        if samples.len() < MIN_TRAJECTORY_POINTS {
            return Err(TrajectoryError::Collection {
                count: samples.len(),
            });
        }

        for (index, sample) in samples.iter().enumerate() {
            if !sample.position().is_finite() {
                return Err(TrajectoryError::InvalidSample {
                    index,
                    message: "coordinates must be finite".to_string(),
                });
            }
            if !sample.dt.is_finite() || sample.dt < 0.0 {
                return Err(TrajectoryError::InvalidSample {
                    index,
                    message: format!("time interval must be finite and >= 0, got {}", sample.dt),
                });
            }
        }

        // Zero-first-delta convention
        samples[0].dt = 0.0;

        let mut cumulative = Vec::with_capacity(samples.len());
        let mut running = 0.0;
        for sample in &samples {
            running += sample.dt;
            cumulative.push(running);
        }

        Ok(Self {
            samples,
            cumulative,
            metadata,
        })
    }

    /// Return a copy with an extra passthrough metadata field
    pub fn with_custom(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.custom.insert(key.into(), value);
        self
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Cumulative timestamps, one per sample
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    pub fn metadata(&self) -> &TrajectoryMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed trajectory
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.samples.len() - 1
    }

    /// Position of the sample at `index`
    pub fn position(&self, index: usize) -> Point {
        self.samples[index].position()
    }

    /// Cumulative timestamp of the sample at `index`
    pub fn timestamp(&self, index: usize) -> f64 {
        self.cumulative[index]
    }

    /// Virtual time of the last sample
    pub fn duration(&self) -> f64 {
        self.cumulative[self.last_index()]
    }

    pub fn start_position(&self) -> Point {
        self.position(0)
    }

    pub fn end_position(&self) -> Point {
        self.position(self.last_index())
    }

    /// Path length recomputed from the samples
    pub fn total_distance(&self) -> f64 {
        path_length(&self.samples)
    }

    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.samples.iter().map(Sample::position)
    }
}

fn path_length(samples: &[Sample]) -> f64 {
    samples
        .windows(2)
        .map(|w| w[0].position().distance(&w[1].position()))
        .sum()
}

pub(crate) fn seconds_to_delta(seconds: f64) -> chrono::Duration {
    chrono::Duration::microseconds((seconds * 1_000_000.0).round() as i64)
}
