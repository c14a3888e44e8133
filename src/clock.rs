//! Time sources for capture and playback.
//!
//! Components never call `Instant::now()` themselves; they are handed a
//! [`Clock`] at construction. Production code uses [`SystemClock`], tests and
//! simulations use [`ManualClock`] so every timing computation is
//! reproducible.

use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::types::seconds_to_delta;

/// The interface components use to read time.
pub trait Clock: Debug + Send + Sync {
    /// Monotonic time since the clock was created.
    fn now(&self) -> Duration;

    /// Wall-clock instant, used only for metadata timestamps.
    fn wall_time(&self) -> DateTime<Utc>;

    /// `now()` in fractional seconds.
    fn now_secs(&self) -> f64 {
        self.now().as_secs_f64()
    }
}

/// Real time: `Instant` for monotonic readings, `Utc::now()` for wall time.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wall_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    elapsed_nanos: Arc<AtomicU64>,
    epoch: DateTime<Utc>,
}

impl ManualClock {
    /// A clock at t=0 whose wall time starts at `epoch`.
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self {
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
            epoch,
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.elapsed_nanos
            .fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Move time forward by fractional seconds.
    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }

    /// Jump to an absolute reading. Going backwards is allowed; callers
    /// simulating monotonic time should not do it.
    pub fn set(&self, at: Duration) {
        self.elapsed_nanos
            .store(at.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }

    fn wall_time(&self) -> DateTime<Utc> {
        self.epoch + seconds_to_delta(self.now_secs())
    }
}
