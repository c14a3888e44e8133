//! Row format codec
//!
//! One header line, then one row per sample:
//!
//! ```text
//! x_coordinate,y_coordinate,time_interval_seconds
//! 100.5,200.25,0.0
//! 101.0,201.75,0.0167
//! ```
//!
//! The delay column is stored rather than cumulative time; cumulative
//! timestamps are rebuilt as a running sum on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::config::MIN_TRAJECTORY_POINTS;
use crate::error::{Result, TrajectoryError};
use crate::types::{Point, Sample, Trajectory};

use super::metadata;

/// Column names of the header row
pub const HEADER: [&str; 3] = ["x_coordinate", "y_coordinate", "time_interval_seconds"];

/// Decimal places kept for coordinates
pub const COORDINATE_DECIMALS: i32 = 2;

/// Decimal places kept for delays
pub const INTERVAL_DECIMALS: i32 = 4;

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    x_coordinate: f64,
    y_coordinate: f64,
    time_interval_seconds: f64,
}

/// Round `value` to `decimals` places
///
/// Values too large to scale have no fractional digits left and come back
/// unchanged.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

/// Write the header and every sample of `trajectory` to `writer`
pub fn write_rows<W: Write>(trajectory: &Trajectory, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for sample in trajectory.samples() {
        writer.serialize(Row {
            x_coordinate: round_to(sample.x, COORDINATE_DECIMALS),
            y_coordinate: round_to(sample.y, COORDINATE_DECIMALS),
            time_interval_seconds: round_to(sample.dt, INTERVAL_DECIMALS),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Encode `trajectory` into row text
pub fn encode(trajectory: &Trajectory) -> Result<String> {
    let mut out = Vec::new();
    write_rows(trajectory, &mut out)?;
    String::from_utf8(out).map_err(|e| TrajectoryError::Serialization(e.to_string()))
}

/// Parse rows strictly, in order
///
/// Any malformed row, non-finite value or negative delay aborts the whole
/// read. Fewer than two rows is also a decode error.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Sample>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| TrajectoryError::decode(csv_line(&e), e.to_string()))?
        .clone();
    for column in HEADER {
        if !headers.iter().any(|h| h == column) {
            return Err(TrajectoryError::decode(1, format!("missing column '{}'", column)));
        }
    }

    let mut samples = Vec::new();
    let mut last_line = 1;
    for result in reader.records() {
        let record = result.map_err(|e| TrajectoryError::decode(csv_line(&e), e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(last_line + 1);
        last_line = line;

        let row: Row = record
            .deserialize(Some(&headers))
            .map_err(|e| TrajectoryError::decode(line, e.to_string()))?;

        if !row.x_coordinate.is_finite() || !row.y_coordinate.is_finite() {
            return Err(TrajectoryError::decode(line, "coordinates must be finite"));
        }
        if !row.time_interval_seconds.is_finite() || row.time_interval_seconds < 0.0 {
            return Err(TrajectoryError::decode(
                line,
                format!(
                    "time interval must be finite and >= 0, got {}",
                    row.time_interval_seconds
                ),
            ));
        }

        samples.push(Sample::new(
            Point::new(row.x_coordinate, row.y_coordinate),
            row.time_interval_seconds,
        ));
    }

    if samples.len() < MIN_TRAJECTORY_POINTS {
        return Err(TrajectoryError::decode(
            last_line,
            format!(
                "expected at least {} rows, found {}",
                MIN_TRAJECTORY_POINTS,
                samples.len()
            ),
        ));
    }

    Ok(samples)
}

/// Decode row text (and an optional sidecar) into a trajectory
///
/// A missing or unusable sidecar is not an error: metadata is recomputed
/// from the points, with its wall-clock range anchored at `fallback_start`.
pub fn decode(
    rows: &str,
    sidecar: Option<&str>,
    fallback_start: DateTime<Utc>,
) -> Result<Trajectory> {
    let samples = read_rows(rows.as_bytes())?;
    let resolved = metadata::resolve(sidecar, &samples, fallback_start);
    Trajectory::with_metadata(samples, resolved.metadata)
}

fn csv_line(error: &csv::Error) -> u64 {
    error.position().map(|p| p.line()).unwrap_or(0)
}
