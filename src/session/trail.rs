//! Bounded history of rendered positions

use std::collections::VecDeque;

use crate::types::Point;

/// Fixed-capacity FIFO of recent positions
///
/// Only read by rendering code; playback timing never consults it.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    points: VecDeque<Point>,
    capacity: usize,
}

impl TrailBuffer {
    /// A capacity of 0 keeps nothing
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a point, evicting the oldest one when full
    pub fn push(&mut self, point: Point) {
        if self.capacity == 0 {
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recently pushed point
    pub fn latest(&self) -> Option<Point> {
        self.points.back().copied()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().copied()
    }

    /// Points paired with a fade factor in (0, 1], oldest faintest
    ///
    /// The point at position `i` gets `(i + 1) / len`, so the newest point is
    /// fully opaque.
    pub fn iter_faded(&self) -> impl Iterator<Item = (Point, f32)> + '_ {
        let len = self.points.len() as f32;
        self.points
            .iter()
            .enumerate()
            .map(move |(i, &p)| (p, (i as f32 + 1.0) / len))
    }
}
