//! Recorder for capturing pointer trajectories

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::Span;

use crate::clock::Clock;
use crate::config::CaptureSettings;
use crate::error::{Result, TrajectoryError};
use crate::types::{
    Point, Sample, Trajectory, TrajectoryMetadata, CAPTURE_END_KEY, CAPTURE_ORIGIN_KEY,
};

use super::types::CaptureState;

/// Capability interface for anything that turns pointer input into a trajectory
pub trait TrajectoryCollector {
    /// Begin a new session, discarding anything in progress
    fn start_capture(&mut self, origin: Point);

    /// Append a sample; ignored while no session is active
    fn record(&mut self, position: Point);

    /// End the session and freeze what was captured
    fn finish_capture(&mut self, end: Point) -> Result<Trajectory>;

    /// Drop all in-progress state without producing a trajectory
    fn reset(&mut self);

    /// Whether a session is active
    fn is_active(&self) -> bool;
}

/// Delta-time sampling recorder
#[derive(Debug)]
pub struct Recorder {
    settings: CaptureSettings,
    clock: Arc<dyn Clock>,
    span: Span,
    state: CaptureState,
    samples: Vec<Sample>,
    origin: Option<Point>,
    /// Wall-clock instant of `start_capture`
    started_at: Option<DateTime<Utc>>,
    /// Monotonic reading of `start_capture`
    session_start: f64,
    /// Monotonic reading of the last accepted sample (or session start)
    last_sample_time: f64,
    /// Samples refused because of `max_points`
    dropped: usize,
}

impl Recorder {
    /// Create a recorder with its capture settings and time source
    pub fn new(settings: CaptureSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            clock,
            span: tracing::debug_span!("recorder"),
            state: CaptureState::Idle,
            samples: Vec::new(),
            origin: None,
            started_at: None,
            session_start: 0.0,
            last_sample_time: 0.0,
            dropped: 0,
        }
    }

    /// Route this recorder's log events under `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Get current state
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Samples captured so far in the active session
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Get number of captured samples
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Samples refused in this session because of the point limit
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// Time since `start_capture`, zero while idle
    pub fn elapsed(&self) -> Duration {
        if !self.state.is_capturing() {
            return Duration::ZERO;
        }
        Duration::from_secs_f64((self.clock.now_secs() - self.session_start).max(0.0))
    }

    fn clear(&mut self) {
        self.samples.clear();
        self.origin = None;
        self.started_at = None;
        self.dropped = 0;
    }
}

impl TrajectoryCollector for Recorder {
    fn start_capture(&mut self, origin: Point) {
        self.clear();
        let now = self.clock.now_secs();
        self.session_start = now;
        self.last_sample_time = now;
        self.started_at = Some(self.clock.wall_time());
        self.origin = Some(origin);
        self.state = CaptureState::Capturing;

        tracing::debug!(parent: &self.span, x = origin.x, y = origin.y, "capture started");
    }

    fn record(&mut self, position: Point) {
        if !self.state.is_capturing() {
            return;
        }

        // Check max points limit
        if self.settings.max_points > 0 && self.samples.len() >= self.settings.max_points {
            self.dropped += 1;
            if self.dropped == 1 {
                tracing::warn!(
                    parent: &self.span,
                    "capture reached {} samples, further samples are dropped",
                    self.settings.max_points
                );
            }
            return;
        }

        let now = self.clock.now_secs();
        let dt = if self.samples.is_empty() {
            0.0
        } else {
            (now - self.last_sample_time).max(0.0)
        };

        self.samples.push(Sample::new(position, dt));
        self.last_sample_time = now;
    }

    fn finish_capture(&mut self, end: Point) -> Result<Trajectory> {
        if !self.state.is_capturing() {
            return Err(TrajectoryError::Collection { count: 0 });
        }
        self.state = CaptureState::Idle;

        let count = self.samples.len();
        if count < self.settings.min_points {
            tracing::warn!(parent: &self.span, count, "capture finished with too few samples");
            self.clear();
            return Err(TrajectoryError::Collection { count });
        }

        let samples = std::mem::take(&mut self.samples);
        let started_at = self.started_at.unwrap_or_else(|| self.clock.wall_time());

        let mut metadata = TrajectoryMetadata::from_samples(&samples, started_at);
        metadata.end_time = self.clock.wall_time().max(started_at);
        if let Some(origin) = self.origin {
            metadata
                .custom
                .insert(CAPTURE_ORIGIN_KEY.to_string(), point_value(origin));
        }
        metadata
            .custom
            .insert(CAPTURE_END_KEY.to_string(), point_value(end));

        let dropped = self.dropped;
        self.clear();

        let trajectory = Trajectory::with_metadata(samples, metadata)?;
        tracing::info!(
            parent: &self.span,
            points = trajectory.len(),
            duration = trajectory.duration(),
            distance = trajectory.total_distance(),
            dropped,
            "capture finished"
        );
        Ok(trajectory)
    }

    fn reset(&mut self) {
        if self.state.is_capturing() {
            tracing::debug!(parent: &self.span, discarded = self.samples.len(), "capture reset");
        }
        self.clear();
        self.state = CaptureState::Idle;
    }

    fn is_active(&self) -> bool {
        self.state.is_capturing()
    }
}

fn point_value(point: Point) -> serde_json::Value {
    serde_json::json!({ "x": point.x, "y": point.y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn recorder_with_clock() -> (Recorder, ManualClock) {
        let clock = ManualClock::default();
        let recorder = Recorder::new(CaptureSettings::default(), Arc::new(clock.clone()));
        (recorder, clock)
    }

    #[test]
    fn test_recorder_lifecycle() {
        let (mut recorder, clock) = recorder_with_clock();
        assert_eq!(recorder.state(), CaptureState::Idle);

        recorder.start_capture(Point::new(10.0, 10.0));
        assert!(recorder.is_active());

        recorder.record(Point::new(10.0, 10.0));
        clock.advance_secs(0.5);
        recorder.record(Point::new(20.0, 10.0));
        clock.advance_secs(0.25);
        recorder.record(Point::new(20.0, 20.0));

        let trajectory = recorder.finish_capture(Point::new(20.0, 20.0)).unwrap();
        assert!(!recorder.is_active());
        assert_eq!(recorder.sample_count(), 0);

        let dts: Vec<f64> = trajectory.samples().iter().map(|s| s.dt).collect();
        assert_eq!(dts, vec![0.0, 0.5, 0.25]);
        assert_eq!(trajectory.cumulative(), &[0.0, 0.5, 0.75]);
    }

    #[test]
    fn test_first_sample_delta_is_zero_even_after_delay() {
        let (mut recorder, clock) = recorder_with_clock();
        recorder.start_capture(Point::new(0.0, 0.0));
        clock.advance_secs(2.0);
        recorder.record(Point::new(1.0, 1.0));
        clock.advance_secs(0.1);
        recorder.record(Point::new(2.0, 2.0));

        let trajectory = recorder.finish_capture(Point::new(2.0, 2.0)).unwrap();
        assert_eq!(trajectory.samples()[0].dt, 0.0);
    }

    #[test]
    fn test_record_while_idle_is_ignored() {
        let (mut recorder, _clock) = recorder_with_clock();
        recorder.record(Point::new(1.0, 1.0));
        assert_eq!(recorder.sample_count(), 0);
    }

    #[test]
    fn test_single_sample_is_collection_error() {
        let (mut recorder, _clock) = recorder_with_clock();
        recorder.start_capture(Point::new(0.0, 0.0));
        recorder.record(Point::new(1.0, 1.0));

        let err = recorder.finish_capture(Point::new(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, TrajectoryError::Collection { count: 1 }));
        assert!(!recorder.is_active());
        assert_eq!(recorder.sample_count(), 0);
    }

    #[test]
    fn test_finish_without_session_is_collection_error() {
        let (mut recorder, _clock) = recorder_with_clock();
        let err = recorder.finish_capture(Point::new(0.0, 0.0)).unwrap_err();
        assert!(err.is_collection());
    }

    #[test]
    fn test_reset_discards_samples() {
        let (mut recorder, _clock) = recorder_with_clock();
        recorder.start_capture(Point::new(0.0, 0.0));
        recorder.record(Point::new(1.0, 1.0));
        recorder.record(Point::new(2.0, 2.0));
        recorder.reset();

        assert!(!recorder.is_active());
        assert_eq!(recorder.sample_count(), 0);
        assert!(recorder.finish_capture(Point::new(2.0, 2.0)).is_err());
    }

    #[test]
    fn test_start_clears_previous_session() {
        let (mut recorder, _clock) = recorder_with_clock();
        recorder.start_capture(Point::new(0.0, 0.0));
        recorder.record(Point::new(1.0, 1.0));
        recorder.start_capture(Point::new(5.0, 5.0));
        assert_eq!(recorder.sample_count(), 0);
    }

    #[test]
    fn test_max_points_drops_extra_samples() {
        let clock = ManualClock::default();
        let settings = CaptureSettings {
            max_points: 3,
            ..Default::default()
        };
        let mut recorder = Recorder::new(settings, Arc::new(clock.clone()));

        recorder.start_capture(Point::new(0.0, 0.0));
        for i in 0..5 {
            clock.advance_secs(0.1);
            recorder.record(Point::new(i as f64, 0.0));
        }

        assert_eq!(recorder.sample_count(), 3);
        assert_eq!(recorder.dropped_count(), 2);
    }

    #[test]
    fn test_metadata_records_capture_endpoints_and_times() {
        let (mut recorder, clock) = recorder_with_clock();
        clock.advance_secs(10.0);
        recorder.start_capture(Point::new(1.0, 2.0));
        recorder.record(Point::new(1.0, 2.0));
        clock.advance_secs(1.0);
        recorder.record(Point::new(3.0, 4.0));
        clock.advance_secs(0.5);

        let trajectory = recorder.finish_capture(Point::new(3.5, 4.5)).unwrap();
        let meta = trajectory.metadata();

        assert_eq!(meta.custom_point(CAPTURE_ORIGIN_KEY), Some(Point::new(1.0, 2.0)));
        assert_eq!(meta.custom_point(CAPTURE_END_KEY), Some(Point::new(3.5, 4.5)));
        assert_eq!(
            meta.end_time - meta.start_time,
            chrono::Duration::milliseconds(1500)
        );
        assert_eq!(meta.duration, 1.0);
    }

    #[test]
    fn test_elapsed() {
        let (mut recorder, clock) = recorder_with_clock();
        assert_eq!(recorder.elapsed(), Duration::ZERO);
        recorder.start_capture(Point::new(0.0, 0.0));
        clock.advance(Duration::from_millis(300));
        assert!((recorder.elapsed().as_secs_f64() - 0.3).abs() < 1e-6);
    }
}
