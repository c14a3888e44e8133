//! Playback clock: wall time → virtual animation time
//!
//! The clock maps monotonic wall time through pause accounting and a live
//! speed multiplier:
//!
//! ```text
//! pause_so_far = accumulated_pause + (paused ? now - pause_start : 0)
//! V            = (now - origin - pause_so_far) * speed
//! ```
//!
//! Every operation that changes `speed` or jumps to a new `V` solves the same
//! equation for a new `origin`, so the value of `V` never jumps unless a jump
//! was asked for.

use std::sync::Arc;

use crate::clock::Clock;

use super::types::PlaybackState;

/// What `start()` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartKind {
    /// From Stopped or Finished: origin re-anchored at now, V = 0
    Fresh,
    /// From Paused: the pause was folded into the accumulated pause time
    Resumed,
    /// Already playing, nothing changed
    Ignored,
}

/// Virtual time source and Stopped/Playing/Paused/Finished state machine
#[derive(Debug)]
pub struct PlaybackClock {
    clock: Arc<dyn Clock>,
    state: PlaybackState,
    /// Speed multiplier (1.0 = real time)
    speed: f64,
    /// Monotonic seconds at which V would read 0 ignoring pauses
    origin: f64,
    /// Total seconds spent in completed pauses
    accumulated_pause: f64,
    /// Monotonic seconds at which the current pause began
    pause_start: f64,
}

impl PlaybackClock {
    /// Create a stopped clock running at `speed`
    pub fn new(clock: Arc<dyn Clock>, speed: f64) -> Self {
        let speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            1.0
        };
        Self {
            clock,
            state: PlaybackState::Stopped,
            speed,
            origin: 0.0,
            accumulated_pause: 0.0,
            pause_start: 0.0,
        }
    }

    /// Get current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Get speed multiplier
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Start or resume
    pub fn start(&mut self) -> StartKind {
        let now = self.clock.now_secs();
        match self.state {
            PlaybackState::Stopped | PlaybackState::Finished => {
                self.origin = now;
                self.accumulated_pause = 0.0;
                self.pause_start = 0.0;
                self.state = PlaybackState::Playing;
                StartKind::Fresh
            }
            PlaybackState::Paused => {
                self.accumulated_pause += now - self.pause_start;
                self.state = PlaybackState::Playing;
                StartKind::Resumed
            }
            PlaybackState::Playing => StartKind::Ignored,
        }
    }

    /// Pause; only has an effect while playing
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        self.pause_start = self.clock.now_secs();
        self.state = PlaybackState::Paused;
        true
    }

    /// Return to Stopped from any state
    pub fn stop(&mut self) {
        self.origin = 0.0;
        self.accumulated_pause = 0.0;
        self.pause_start = 0.0;
        self.state = PlaybackState::Stopped;
    }

    /// Playing → Finished; ignored from any other state
    pub fn finish(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        self.state = PlaybackState::Finished;
        true
    }

    /// Seconds of wall time spent paused as of `now`
    fn pause_so_far(&self, now: f64) -> f64 {
        let current = if self.state == PlaybackState::Paused {
            now - self.pause_start
        } else {
            0.0
        };
        self.accumulated_pause + current
    }

    fn animation_time_at(&self, now: f64) -> f64 {
        if !self.state.has_origin() {
            return 0.0;
        }
        (now - self.origin - self.pause_so_far(now)) * self.speed
    }

    /// The authoritative virtual animation time V (0 while stopped)
    pub fn current_animation_time(&self) -> f64 {
        self.animation_time_at(self.clock.now_secs())
    }

    /// Change the multiplier without moving V
    ///
    /// Returns false (and changes nothing) for non-finite or non-positive
    /// speeds.
    pub fn set_speed(&mut self, new_speed: f64) -> bool {
        if !new_speed.is_finite() || new_speed <= 0.0 {
            return false;
        }

        if self.state.has_origin() {
            let now = self.clock.now_secs();
            let v = self.animation_time_at(now);
            self.origin = now - self.pause_so_far(now) - v / new_speed;
        }
        self.speed = new_speed;
        true
    }

    /// Jump V to `time`
    ///
    /// While playing or paused only the origin moves. From Stopped or
    /// Finished the clock lands in Paused at `time`, so a following `start()`
    /// resumes from there.
    pub fn seek(&mut self, time: f64) {
        let time = time.max(0.0);
        let now = self.clock.now_secs();

        match self.state {
            PlaybackState::Playing | PlaybackState::Paused => {
                self.origin = now - self.pause_so_far(now) - time / self.speed;
            }
            PlaybackState::Stopped | PlaybackState::Finished => {
                self.accumulated_pause = 0.0;
                self.pause_start = now;
                self.origin = now - time / self.speed;
                self.state = PlaybackState::Paused;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const EPS: f64 = 1e-9;

    fn clock_pair(speed: f64) -> (PlaybackClock, ManualClock) {
        let manual = ManualClock::default();
        (PlaybackClock::new(Arc::new(manual.clone()), speed), manual)
    }

    #[test]
    fn test_stopped_reads_zero() {
        let (clock, manual) = clock_pair(1.0);
        manual.advance_secs(5.0);
        assert_eq!(clock.current_animation_time(), 0.0);
    }

    #[test]
    fn test_state_transitions() {
        let (mut clock, _manual) = clock_pair(1.0);
        assert_eq!(clock.state(), PlaybackState::Stopped);

        assert!(!clock.pause());
        assert_eq!(clock.state(), PlaybackState::Stopped);

        assert_eq!(clock.start(), StartKind::Fresh);
        assert_eq!(clock.start(), StartKind::Ignored);
        assert!(clock.pause());
        assert!(!clock.pause());
        assert!(!clock.finish());
        assert_eq!(clock.start(), StartKind::Resumed);
        assert!(clock.finish());
        assert_eq!(clock.state(), PlaybackState::Finished);
        assert_eq!(clock.start(), StartKind::Fresh);

        clock.stop();
        assert_eq!(clock.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_realtime_and_scaled() {
        let (mut clock, manual) = clock_pair(2.0);
        clock.start();
        manual.advance_secs(1.5);
        assert!((clock.current_animation_time() - 3.0).abs() < EPS);
    }

    #[test]
    fn test_pause_freezes_time() {
        let (mut clock, manual) = clock_pair(1.0);
        clock.start();
        manual.advance_secs(1.0);
        clock.pause();
        let frozen = clock.current_animation_time();
        manual.advance_secs(10.0);
        assert!((clock.current_animation_time() - frozen).abs() < EPS);
    }

    #[test]
    fn test_pause_resume_preserves_progress() {
        let (mut clock, manual) = clock_pair(1.0);
        clock.start();
        manual.advance_secs(0.8);
        let before = clock.current_animation_time();
        clock.pause();
        manual.advance_secs(3.0);
        clock.start();
        let after = clock.current_animation_time();
        assert!((before - after).abs() < EPS);

        manual.advance_secs(0.2);
        assert!((clock.current_animation_time() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_speed_change_at_one_second() {
        let (mut clock, manual) = clock_pair(1.0);
        clock.start();
        manual.advance_secs(1.0);
        assert!((clock.current_animation_time() - 1.0).abs() < EPS);

        assert!(clock.set_speed(2.0));
        assert!((clock.current_animation_time() - 1.0).abs() < EPS);

        manual.advance_secs(0.5);
        assert!((clock.current_animation_time() - 2.0).abs() < EPS);
    }

    #[test]
    fn test_speed_change_while_paused_holds_after_resume() {
        let (mut clock, manual) = clock_pair(1.0);
        clock.start();
        manual.advance_secs(2.0);
        clock.pause();
        manual.advance_secs(1.0);
        let v = clock.current_animation_time();

        clock.set_speed(4.0);
        assert!((clock.current_animation_time() - v).abs() < EPS);

        manual.advance_secs(7.0);
        clock.start();
        assert!((clock.current_animation_time() - v).abs() < EPS);

        manual.advance_secs(0.25);
        assert!((clock.current_animation_time() - (v + 1.0)).abs() < EPS);
    }

    #[test]
    fn test_speed_change_while_stopped_applies_on_start() {
        let (mut clock, manual) = clock_pair(1.0);
        clock.set_speed(0.5);
        clock.start();
        manual.advance_secs(2.0);
        assert!((clock.current_animation_time() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_invalid_speed_ignored() {
        let (mut clock, _manual) = clock_pair(1.0);
        assert!(!clock.set_speed(0.0));
        assert!(!clock.set_speed(-1.0));
        assert!(!clock.set_speed(f64::NAN));
        assert_eq!(clock.speed(), 1.0);
    }

    #[test]
    fn test_seek_while_playing() {
        let (mut clock, manual) = clock_pair(2.0);
        clock.start();
        manual.advance_secs(1.0);
        clock.seek(0.5);
        assert!((clock.current_animation_time() - 0.5).abs() < EPS);
        manual.advance_secs(0.5);
        assert!((clock.current_animation_time() - 1.5).abs() < EPS);
    }

    #[test]
    fn test_seek_from_stopped_lands_paused() {
        let (mut clock, manual) = clock_pair(1.0);
        manual.advance_secs(3.0);
        clock.seek(1.25);
        assert_eq!(clock.state(), PlaybackState::Paused);
        manual.advance_secs(2.0);
        assert!((clock.current_animation_time() - 1.25).abs() < EPS);

        assert_eq!(clock.start(), StartKind::Resumed);
        manual.advance_secs(0.75);
        assert!((clock.current_animation_time() - 2.0).abs() < EPS);
    }

    #[test]
    fn test_fresh_start_after_stop_resets_time() {
        let (mut clock, manual) = clock_pair(1.0);
        clock.start();
        manual.advance_secs(4.0);
        clock.stop();
        clock.start();
        assert_eq!(clock.current_animation_time(), 0.0);
    }
}
