//! Boundary to trajectory synthesis models
//!
//! Models that learn from recorded trajectories and generate new ones live
//! outside this crate. They only need to produce a [`Trajectory`]; anything
//! they return is validated like a capture and can be saved and replayed
//! exactly like one.

use crate::error::Result;
use crate::types::{Point, Trajectory};

/// Input to a synthesis model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisRequest {
    pub start: Point,
    pub end: Point,
    /// Fixed seed for reproducible output, if the model supports one
    pub seed: Option<u64>,
}

impl SynthesisRequest {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Straight-line distance the generated path has to cover
    pub fn span(&self) -> f64 {
        self.start.distance(&self.end)
    }
}

/// A model that generates trajectories
#[cfg_attr(test, mockall::automock)]
pub trait TrajectoryModel {
    /// Generate a path from `request.start` to `request.end`
    fn predict(&self, request: &SynthesisRequest) -> Result<Trajectory>;
}
