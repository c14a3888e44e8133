//! Capture and playback sessions
//!
//! This module turns live pointer input into trajectories and replays them
//! with frame-rate independent timing.
//!
//! # Features
//!
//! - Delta-time sampling of pointer positions while a capture is active
//! - A playback clock with pause accounting and a live speed multiplier
//! - Interpolation between the two samples bracketing the virtual time
//! - A bounded trail of reached positions for rendering feedback
//! - Seeking by time or progress

pub mod playback_clock;
pub mod player;
pub mod recorder;
pub mod sampler;
pub mod trail;
pub mod types;

pub use playback_clock::{PlaybackClock, StartKind};
pub use player::TrajectoryPlayer;
pub use recorder::{Recorder, TrajectoryCollector};
pub use sampler::{position_at, scan_forward, CursorScan};
pub use trail::TrailBuffer;
pub use types::{CaptureState, PlaybackState};
