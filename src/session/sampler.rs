//! Virtual time → position
//!
//! Two pure queries over a [`Trajectory`]: a forward-only cursor scan and
//! linear interpolation between the samples bracketing the cursor. Neither
//! holds state; the player owns the cursor.

use crate::types::{Point, Trajectory};

/// Result of a forward cursor scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorScan {
    /// First index at or after the starting cursor whose timestamp is >= V,
    /// or the last index when V is past the end
    pub index: usize,
    /// V exceeds the final cumulative timestamp
    pub past_end: bool,
}

/// Scan forward from `from` for the first sample whose timestamp reaches `v`
///
/// Indices before `from` are never revisited.
pub fn scan_forward(trajectory: &Trajectory, v: f64, from: usize) -> CursorScan {
    let cumulative = trajectory.cumulative();
    let from = from.min(trajectory.last_index());

    match cumulative[from..].iter().position(|&t| t >= v) {
        Some(offset) => CursorScan {
            index: from + offset,
            past_end: false,
        },
        None => CursorScan {
            index: trajectory.last_index(),
            past_end: true,
        },
    }
}

/// Fraction of the segment `prev → cursor` covered at virtual time `v`
///
/// Zero-length segments report 1 so the position snaps to the cursor sample.
pub fn segment_progress(trajectory: &Trajectory, v: f64, cursor: usize) -> f64 {
    let (prev, next) = bracket(trajectory, cursor);
    let start = trajectory.timestamp(prev);
    let segment = trajectory.timestamp(next) - start;

    if segment > 0.0 {
        ((v - start) / segment).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Interpolated position at virtual time `v` with the given cursor
///
/// The result always lies on the segment between two consecutive recorded
/// samples.
pub fn position_at(trajectory: &Trajectory, v: f64, cursor: usize) -> Point {
    let (prev, next) = bracket(trajectory, cursor);
    let t = segment_progress(trajectory, v, cursor);
    trajectory.position(prev).lerp(trajectory.position(next), t)
}

fn bracket(trajectory: &Trajectory, cursor: usize) -> (usize, usize) {
    let next = cursor.min(trajectory.last_index());
    (next.saturating_sub(1), next)
}
