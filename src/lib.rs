//! # pointer-replay: pointer trajectory capture and playback
//!
//! Records a pointer's movement as a sequence of timed samples, persists it
//! in a small row format with a JSON sidecar, and replays it with a pausable,
//! variable-speed clock whose output does not depend on the host frame rate.
//!
//! ## Architecture
//!
//! - **Session**: the [`Recorder`](session::Recorder) during capture; the
//!   [`TrajectoryPlayer`](session::TrajectoryPlayer) (playback clock, sampler,
//!   trail) during playback
//! - **Storage**: row codec, sidecar metadata, and the shared exchange directory
//! - **Input**: event sources and the press/drag/release capture controller
//! - **Synthesis**: the boundary trait for external trajectory models
//!
//! Every component takes its configuration section and a [`Clock`] at
//! construction, and logs through a `tracing` span it is handed (or a default
//! one). Nothing reads global state.
//!
//! ## Example
//!
//! ```ignore
//! use pointer_replay::{
//!     clock::SystemClock,
//!     config::Config,
//!     session::{Recorder, TrajectoryCollector, TrajectoryPlayer},
//!     storage::{ExchangeDirectory, TrajectoryStore},
//!     types::Point,
//! };
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let clock = Arc::new(SystemClock::new());
//!
//! let mut recorder = Recorder::new(config.capture.clone(), clock.clone());
//! recorder.start_capture(Point::new(10.0, 10.0));
//! recorder.record(Point::new(12.0, 11.0));
//! recorder.record(Point::new(20.0, 15.0));
//! let trajectory = recorder.finish_capture(Point::new(20.0, 15.0))?;
//!
//! let store = ExchangeDirectory::open(config.storage.clone())?;
//! let path = store.save(&trajectory)?;
//!
//! let mut player = TrajectoryPlayer::new(store.load(&path)?, config.playback.clone(), clock);
//! player.start();
//! while !player.is_finished() {
//!     player.advance();
//!     let _position = player.position();
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod session;
pub mod storage;
pub mod synth;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Result, TrajectoryError};
pub use input::{CaptureController, ChannelEventSource, EventSource, InputEvent};
pub use session::{PlaybackState, Recorder, TrajectoryCollector, TrajectoryPlayer};
pub use storage::{ExchangeDirectory, TrajectoryStore};
pub use synth::{SynthesisRequest, TrajectoryModel};
pub use types::{Point, Sample, Trajectory, TrajectoryMetadata};
