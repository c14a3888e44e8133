//! Sidecar metadata documents
//!
//! The sidecar is a pretty-printed JSON object next to the row file holding
//! the derived statistics plus any passthrough fields. It is read leniently:
//! anything wrong with it only means the statistics get recomputed.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{Result, TrajectoryError};
use crate::types::{Sample, TrajectoryMetadata};

/// Keys owned by [`TrajectoryMetadata`]; everything else is passthrough
const KNOWN_KEYS: [&str; 6] = [
    "start_time",
    "end_time",
    "duration",
    "total_distance",
    "average_speed",
    "point_count",
];

/// Where resolved metadata came from
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataSource {
    /// Read from the sidecar
    Sidecar,
    /// Computed from the points; the sidecar was absent or unusable
    Recomputed { reason: Option<String> },
}

/// Metadata chosen for a loaded trajectory
#[derive(Debug, Clone)]
pub struct ResolvedMetadata {
    pub metadata: TrajectoryMetadata,
    pub source: MetadataSource,
}

/// Serialize metadata as a sidecar document
pub fn encode_sidecar(metadata: &TrajectoryMetadata) -> Result<String> {
    serde_json::to_string_pretty(metadata).map_err(|e| TrajectoryError::Serialization(e.to_string()))
}

/// Parse a sidecar against the samples it describes
///
/// Timestamps may be RFC 3339 or naive ISO-8601 (read as UTC). Missing
/// statistics are filled in from the samples. A `point_count` that disagrees
/// with the samples marks the sidecar as belonging to some other file.
pub fn parse_sidecar(text: &str, samples: &[Sample]) -> Result<TrajectoryMetadata> {
    let mut map: Map<String, Value> =
        serde_json::from_str(text).map_err(|e| TrajectoryError::Metadata(e.to_string()))?;

    let start_time = match map.get("start_time") {
        Some(value) => parse_timestamp(value)?,
        None => return Err(TrajectoryError::Metadata("missing start_time".to_string())),
    };

    if let Some(count) = map.get("point_count") {
        let count = count
            .as_u64()
            .ok_or_else(|| TrajectoryError::Metadata("point_count is not an integer".to_string()))?;
        if count as usize != samples.len() {
            return Err(TrajectoryError::Metadata(format!(
                "point_count {} does not match {} rows",
                count,
                samples.len()
            )));
        }
    }

    let mut metadata = TrajectoryMetadata::from_samples(samples, start_time);
    if let Some(value) = map.get("end_time") {
        metadata.end_time = parse_timestamp(value)?;
    }
    if let Some(v) = number(&map, "duration")? {
        metadata.duration = v;
    }
    if let Some(v) = number(&map, "total_distance")? {
        metadata.total_distance = v;
    }
    if let Some(v) = number(&map, "average_speed")? {
        metadata.average_speed = v;
    }

    for key in KNOWN_KEYS {
        map.remove(key);
    }
    metadata.custom = map;
    Ok(metadata)
}

/// Use the sidecar when it is usable, otherwise recompute from the samples
pub fn resolve(
    sidecar: Option<&str>,
    samples: &[Sample],
    fallback_start: DateTime<Utc>,
) -> ResolvedMetadata {
    let reason = match sidecar.map(|text| parse_sidecar(text, samples)) {
        Some(Ok(metadata)) => {
            return ResolvedMetadata {
                metadata,
                source: MetadataSource::Sidecar,
            }
        }
        Some(Err(e)) => Some(e.to_string()),
        None => None,
    };

    ResolvedMetadata {
        metadata: TrajectoryMetadata::from_samples(samples, fallback_start),
        source: MetadataSource::Recomputed { reason },
    }
}

fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>> {
    let text = value
        .as_str()
        .ok_or_else(|| TrajectoryError::Metadata(format!("timestamp is not a string: {}", value)))?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| TrajectoryError::Metadata(format!("invalid timestamp '{}': {}", text, e)))
}

fn number(map: &Map<String, Value>, key: &str) -> Result<Option<f64>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(Some)
            .ok_or_else(|| TrajectoryError::Metadata(format!("{} is not a valid number", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, Trajectory};
    use chrono::TimeZone;

    fn samples() -> Vec<Sample> {
        vec![
            Sample::new(Point::new(0.0, 0.0), 0.0),
            Sample::new(Point::new(3.0, 4.0), 0.5),
            Sample::new(Point::new(6.0, 8.0), 0.5),
        ]
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_sidecar_round_trip_keeps_passthrough() {
        let t = Trajectory::new(samples(), start())
            .unwrap()
            .with_custom("operator", Value::from("lab-3"));
        let text = encode_sidecar(t.metadata()).unwrap();

        let parsed = parse_sidecar(&text, t.samples()).unwrap();
        assert_eq!(&parsed, t.metadata());
        assert_eq!(parsed.custom.get("operator"), Some(&Value::from("lab-3")));
    }

    #[test]
    fn test_naive_timestamps_are_utc() {
        let text = r#"{
            "start_time": "2025-03-01T08:00:00.250000",
            "end_time": "2025-03-01T08:00:01.250000",
            "duration": 1.0,
            "total_distance": 10.0,
            "average_speed": 10.0,
            "point_count": 3
        }"#;
        let meta = parse_sidecar(text, &samples()).unwrap();
        assert_eq!(meta.start_time, start() + chrono::Duration::milliseconds(250));
        assert_eq!(meta.end_time - meta.start_time, chrono::Duration::seconds(1));
        assert!(meta.custom.is_empty());
    }

    #[test]
    fn test_missing_statistics_are_recomputed() {
        let text = r#"{ "start_time": "2025-03-01T08:00:00Z" }"#;
        let meta = parse_sidecar(text, &samples()).unwrap();
        assert_eq!(meta.duration, 1.0);
        assert_eq!(meta.total_distance, 10.0);
        assert_eq!(meta.point_count, 3);
    }

    #[test]
    fn test_point_count_mismatch_is_rejected() {
        let text = r#"{ "start_time": "2025-03-01T08:00:00Z", "point_count": 7 }"#;
        assert!(parse_sidecar(text, &samples()).is_err());
    }

    #[test]
    fn test_resolve_falls_back_on_corrupt_sidecar() {
        let resolved = resolve(Some("{not json"), &samples(), start());
        assert!(matches!(
            resolved.source,
            MetadataSource::Recomputed { reason: Some(_) }
        ));
        assert_eq!(resolved.metadata.start_time, start());
        assert_eq!(resolved.metadata.average_speed, 10.0);
    }

    #[test]
    fn test_resolve_without_sidecar() {
        let resolved = resolve(None, &samples(), start());
        assert_eq!(resolved.source, MetadataSource::Recomputed { reason: None });
        assert_eq!(resolved.metadata.point_count, 3);
    }
}
