//! Trajectory player for replaying recorded or generated paths

use std::sync::Arc;
use tracing::Span;

use crate::clock::Clock;
use crate::config::PlaybackSettings;
use crate::types::{Point, Trajectory};

use super::playback_clock::{PlaybackClock, StartKind};
use super::sampler;
use super::trail::TrailBuffer;
use super::types::PlaybackState;

/// Tolerance when matching the current speed against the configured options
const SPEED_EPSILON: f64 = 1e-9;

/// Plays one trajectory against a [`Clock`]
///
/// The host loop calls [`advance`](Self::advance) once per tick and then
/// queries [`position`](Self::position) and [`trail`](Self::trail). Output
/// depends only on the clock readings, never on how often the host ticks.
#[derive(Debug)]
pub struct TrajectoryPlayer {
    trajectory: Trajectory,
    settings: PlaybackSettings,
    clock: PlaybackClock,
    /// Index of the most recently reached sample
    cursor: usize,
    trail: TrailBuffer,
    span: Span,
}

impl TrajectoryPlayer {
    /// Create a stopped player at the configured default speed
    pub fn new(trajectory: Trajectory, settings: PlaybackSettings, clock: Arc<dyn Clock>) -> Self {
        let speed = settings.clamp_speed(settings.default_speed());
        let trail = TrailBuffer::new(settings.trail_capacity);
        Self {
            trajectory,
            clock: PlaybackClock::new(clock, speed),
            settings,
            cursor: 0,
            trail,
            span: tracing::debug_span!("player"),
        }
    }

    /// Route this player's log events under `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Get the loaded trajectory
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Get current state
    pub fn state(&self) -> PlaybackState {
        self.clock.state()
    }

    /// Check if playing
    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    /// Check if finished
    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    /// Get current cursor index
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Get the trail of reached positions
    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    /// Get playback speed
    pub fn speed(&self) -> f64 {
        self.clock.speed()
    }

    /// Current virtual animation time
    pub fn animation_time(&self) -> f64 {
        self.clock.current_animation_time()
    }

    /// Get total duration in virtual seconds
    pub fn total_duration(&self) -> f64 {
        self.trajectory.duration()
    }

    /// Get playback progress by sample index (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        self.cursor as f64 / self.trajectory.last_index() as f64
    }

    /// Start, resume, or replay from the beginning after finishing
    pub fn start(&mut self) {
        match self.clock.start() {
            StartKind::Fresh => {
                self.cursor = 0;
                self.trail.clear();
                self.trail.push(self.trajectory.start_position());
                tracing::debug!(
                    parent: &self.span,
                    points = self.trajectory.len(),
                    speed = self.speed(),
                    "playback started"
                );
            }
            StartKind::Resumed => {
                tracing::debug!(parent: &self.span, time = self.animation_time(), "playback resumed");
            }
            StartKind::Ignored => {}
        }
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.clock.pause() {
            tracing::debug!(parent: &self.span, time = self.animation_time(), "playback paused");
        }
    }

    /// Pause while playing, otherwise start
    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Stop playback and reset to the beginning
    pub fn stop(&mut self) {
        self.clock.stop();
        self.cursor = 0;
        self.trail.clear();
    }

    /// Set playback speed, clamped into the configured bounds
    ///
    /// Virtual time is continuous across the change in every state.
    pub fn set_speed(&mut self, speed: f64) {
        if !speed.is_finite() || speed <= 0.0 {
            tracing::warn!(parent: &self.span, speed, "ignoring invalid playback speed");
            return;
        }
        let speed = self.settings.clamp_speed(speed);
        if self.clock.set_speed(speed) {
            tracing::debug!(parent: &self.span, speed, "playback speed changed");
        }
    }

    /// Step to the next faster configured speed, if any
    pub fn speed_up(&mut self) {
        let current = self.speed();
        if let Some(next) = self
            .settings
            .speed_options
            .iter()
            .copied()
            .filter(|&s| s > current + SPEED_EPSILON)
            .min_by(f64::total_cmp)
        {
            self.set_speed(next);
        }
    }

    /// Step to the next slower configured speed, if any
    pub fn speed_down(&mut self) {
        let current = self.speed();
        if let Some(next) = self
            .settings
            .speed_options
            .iter()
            .copied()
            .filter(|&s| s < current - SPEED_EPSILON)
            .max_by(f64::total_cmp)
        {
            self.set_speed(next);
        }
    }

    /// Seek to a virtual time, clamped to the trajectory
    ///
    /// The cursor is rescanned from the first sample and the trail rebuilt
    /// from every sample up to it. From Stopped or Finished the player ends
    /// up Paused at `time`.
    pub fn seek(&mut self, time: f64) {
        let time = if time.is_finite() {
            time.clamp(0.0, self.total_duration())
        } else {
            0.0
        };

        self.clock.seek(time);
        self.cursor = sampler::scan_forward(&self.trajectory, time, 0).index;

        self.trail.clear();
        for i in 0..=self.cursor {
            self.trail.push(self.trajectory.position(i));
        }

        tracing::debug!(parent: &self.span, time, cursor = self.cursor, "playback seek");
    }

    /// Seek by progress (0.0 to 1.0)
    pub fn seek_progress(&mut self, progress: f64) {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.seek(self.total_duration() * progress);
    }

    /// Move the cursor up to the current virtual time (call this each tick)
    ///
    /// Every sample passed is pushed onto the trail individually. Returns the
    /// number of samples newly reached.
    pub fn advance(&mut self) -> usize {
        if !self.is_playing() {
            return 0;
        }

        let v = self.clock.current_animation_time();
        let scan = sampler::scan_forward(&self.trajectory, v, self.cursor);

        let reached = scan.index - self.cursor;
        for i in self.cursor + 1..=scan.index {
            self.trail.push(self.trajectory.position(i));
        }
        self.cursor = scan.index;

        if scan.past_end && self.clock.finish() {
            tracing::info!(
                parent: &self.span,
                duration = self.total_duration(),
                points = self.trajectory.len(),
                "playback finished"
            );
        }

        reached
    }

    /// Position to render this tick
    ///
    /// Interpolated while playing; otherwise the cursor sample itself.
    pub fn position(&self) -> Point {
        if self.is_playing() {
            self.position_at(self.clock.current_animation_time())
        } else {
            self.trajectory.position(self.cursor)
        }
    }

    /// Interpolated position at `v` using the current cursor
    pub fn position_at(&self, v: f64) -> Point {
        sampler::position_at(&self.trajectory, v, self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::types::Sample;
    use chrono::{DateTime, Utc};

    const EPS: f64 = 1e-9;

    fn create_test_trajectory() -> Trajectory {
        Trajectory::new(
            vec![
                Sample::new(Point::new(0.0, 0.0), 0.0),
                Sample::new(Point::new(10.0, 0.0), 1.0),
                Sample::new(Point::new(10.0, 20.0), 1.0),
            ],
            DateTime::<Utc>::UNIX_EPOCH,
        )
        .unwrap()
    }

    fn create_player() -> (TrajectoryPlayer, ManualClock) {
        let clock = ManualClock::default();
        let player = TrajectoryPlayer::new(
            create_test_trajectory(),
            PlaybackSettings::default(),
            Arc::new(clock.clone()),
        );
        (player, clock)
    }

    #[test]
    fn test_player_lifecycle() {
        let (mut player, _clock) = create_player();
        assert_eq!(player.state(), PlaybackState::Stopped);

        player.start();
        assert_eq!(player.state(), PlaybackState::Playing);

        player.pause();
        assert_eq!(player.state(), PlaybackState::Paused);

        player.toggle();
        assert_eq!(player.state(), PlaybackState::Playing);

        player.stop();
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(player.cursor(), 0);
        assert!(player.trail().is_empty());
    }

    #[test]
    fn test_fresh_start_seeds_trail() {
        let (mut player, _clock) = create_player();
        player.start();
        assert_eq!(player.trail().len(), 1);
        assert_eq!(player.trail().latest(), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_midpoint_at_one_and_a_half_seconds() {
        let (mut player, clock) = create_player();
        player.start();
        clock.advance_secs(1.5);
        player.advance();

        assert_eq!(player.cursor(), 2);
        let pos = player.position();
        assert!((pos.x - 10.0).abs() < EPS);
        assert!((pos.y - 10.0).abs() < EPS);
    }

    #[test]
    fn test_advance_pushes_every_skipped_sample() {
        let (mut player, clock) = create_player();
        player.start();
        clock.advance_secs(1.9);
        assert_eq!(player.advance(), 2);

        let trail: Vec<Point> = player.trail().iter().collect();
        assert_eq!(
            trail,
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 20.0)
            ]
        );
    }

    #[test]
    fn test_clamp_at_end_finishes() {
        let (mut player, clock) = create_player();
        player.start();
        clock.advance_secs(5.0);
        player.advance();

        assert_eq!(player.state(), PlaybackState::Finished);
        assert_eq!(player.cursor(), 2);
        assert_eq!(player.position(), Point::new(10.0, 20.0));
        assert_eq!(player.position_at(100.0), Point::new(10.0, 20.0));
        assert_eq!(player.progress(), 1.0);
    }

    #[test]
    fn test_advance_ignored_unless_playing() {
        let (mut player, clock) = create_player();
        clock.advance_secs(1.5);
        assert_eq!(player.advance(), 0);
        assert_eq!(player.cursor(), 0);
    }

    #[test]
    fn test_paused_position_snaps_to_cursor() {
        let (mut player, clock) = create_player();
        player.start();
        clock.advance_secs(0.5);
        player.advance();
        player.pause();
        assert_eq!(player.position(), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_speed_change_keeps_position() {
        let (mut player, clock) = create_player();
        player.start();
        clock.advance_secs(1.0);
        player.advance();
        let before = player.animation_time();

        player.set_speed(2.0);
        assert!((player.animation_time() - before).abs() < EPS);
        assert!((player.animation_time() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_speed_clamped_and_invalid_ignored() {
        let (mut player, _clock) = create_player();
        player.set_speed(100.0);
        assert_eq!(player.speed(), 10.0);
        player.set_speed(0.01);
        assert_eq!(player.speed(), 0.1);
        player.set_speed(f64::NAN);
        assert_eq!(player.speed(), 0.1);
        player.set_speed(-2.0);
        assert_eq!(player.speed(), 0.1);
    }

    #[test]
    fn test_speed_stepping() {
        let (mut player, _clock) = create_player();
        assert_eq!(player.speed(), 1.0);

        player.speed_up();
        assert_eq!(player.speed(), 2.0);
        player.speed_up();
        player.speed_up();
        assert_eq!(player.speed(), 4.0);

        player.speed_down();
        player.speed_down();
        player.speed_down();
        player.speed_down();
        assert_eq!(player.speed(), 0.25);
        player.speed_down();
        assert_eq!(player.speed(), 0.25);
    }

    #[test]
    fn test_speed_up_from_off_grid_speed() {
        let (mut player, _clock) = create_player();
        player.set_speed(0.7);
        player.speed_up();
        assert_eq!(player.speed(), 1.0);
    }

    #[test]
    fn test_seek_from_stopped() {
        let (mut player, clock) = create_player();
        player.seek(1.0);
        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(player.cursor(), 1);
        assert_eq!(player.trail().len(), 2);

        player.start();
        clock.advance_secs(0.5);
        player.advance();
        assert!((player.animation_time() - 1.5).abs() < EPS);
        assert_eq!(player.position(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_seek_backwards_rescans() {
        let (mut player, clock) = create_player();
        player.start();
        clock.advance_secs(1.8);
        player.advance();
        assert_eq!(player.cursor(), 2);

        player.seek(0.5);
        assert_eq!(player.cursor(), 1);
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_seek_progress_clamps() {
        let (mut player, _clock) = create_player();
        player.seek_progress(2.0);
        assert_eq!(player.cursor(), 2);
        assert!((player.animation_time() - 2.0).abs() < EPS);
    }

    #[test]
    fn test_replay_after_finish() {
        let (mut player, clock) = create_player();
        player.start();
        clock.advance_secs(3.0);
        player.advance();
        assert!(player.is_finished());

        player.start();
        assert!(player.is_playing());
        assert_eq!(player.cursor(), 0);
        assert_eq!(player.animation_time(), 0.0);
        assert_eq!(player.trail().len(), 1);
    }

    #[test]
    fn test_trail_independent_of_tick_rate() {
        let (mut coarse, coarse_clock) = create_player();
        let (mut fine, fine_clock) = create_player();
        coarse.start();
        fine.start();

        coarse_clock.advance_secs(1.75);
        coarse.advance();
        for _ in 0..7 {
            fine_clock.advance_secs(0.25);
            fine.advance();
        }

        let a: Vec<Point> = coarse.trail().iter().collect();
        let b: Vec<Point> = fine.trail().iter().collect();
        assert_eq!(a, b);
        assert_eq!(coarse.position(), fine.position());
    }
}
