//! Test data builders for creating test objects

use chrono::{DateTime, TimeZone, Utc};
use pointer_replay::{Point, Sample, Trajectory};

/// Builder for creating test Trajectories
pub struct TrajectoryBuilder {
    samples: Vec<Sample>,
    start_time: DateTime<Utc>,
}

impl TrajectoryBuilder {
    /// Start at `(x, y)` with the zero first delay
    pub fn starting_at(x: f64, y: f64) -> Self {
        Self {
            samples: vec![Sample::new(Point::new(x, y), 0.0)],
            start_time: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
        }
    }

    /// Move to `(x, y)` after `dt` seconds
    pub fn then(mut self, x: f64, y: f64, dt: f64) -> Self {
        self.samples.push(Sample::new(Point::new(x, y), dt));
        self
    }

    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn build(self) -> Trajectory {
        Trajectory::new(self.samples, self.start_time).unwrap()
    }
}

/// The three-sample path with `dt = [0, 1, 1]`
pub fn three_point_trajectory() -> Trajectory {
    TrajectoryBuilder::starting_at(0.0, 0.0)
        .then(100.0, 0.0, 1.0)
        .then(100.0, 50.0, 1.0)
        .build()
}
