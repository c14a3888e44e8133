//! Pointer input plumbing
//!
//! Input arrives through an [`EventSource`], which the host loop polls once
//! per tick. [`ChannelEventSource`] is the usual implementation: any thread
//! producing pointer events sends them down a crossbeam channel, and the
//! loop thread drains it, so the recorder is only ever touched from one
//! place.
//!
//! [`CaptureController`] turns a press/drag/release gesture into a capture
//! session on a [`TrajectoryCollector`].

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::Span;

use crate::config::CaptureSettings;
use crate::error::TrajectoryError;
use crate::session::TrajectoryCollector;
use crate::types::{Point, Trajectory};

/// A pointer event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Button pressed at a position
    Press(Point),
    /// Pointer moved
    Move(Point),
    /// Button released at a position
    Release(Point),
}

/// Anything the host loop can poll for pointer events
#[cfg_attr(test, mockall::automock)]
pub trait EventSource {
    /// Take every event that arrived since the last poll, oldest first
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Whether no further events will ever arrive
    fn is_closed(&self) -> bool {
        false
    }
}

/// Event source fed from a crossbeam channel
#[derive(Debug)]
pub struct ChannelEventSource {
    rx: Receiver<InputEvent>,
    closed: bool,
}

impl ChannelEventSource {
    /// Create an unbounded channel and the source draining it
    pub fn channel() -> (Sender<InputEvent>, Self) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (tx, Self::new(rx))
    }

    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx, closed: false }
    }
}

impl EventSource for ChannelEventSource {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
        events
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Circular target area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureZone {
    pub center: Point,
    pub radius: f64,
}

impl CaptureZone {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.is_within(&self.center, self.radius)
    }
}

/// What a gesture produced
#[derive(Debug)]
pub enum CaptureOutcome {
    /// Released inside the end zone with enough samples
    Completed(Trajectory),
    /// Released inside the end zone, but the capture was unusable
    Rejected(TrajectoryError),
    /// Released outside the end zone; the samples were discarded
    Abandoned { release: Point },
}

/// Drives a collector from press/drag/release gestures
///
/// A press inside the start zone begins a capture, every move while it is
/// active records a sample, and a release inside the end zone finishes it.
/// Releasing anywhere else abandons the attempt. Without zones any press
/// starts and any release finishes.
#[derive(Debug)]
pub struct CaptureController<C: TrajectoryCollector> {
    collector: C,
    radius: f64,
    start_zone: Option<CaptureZone>,
    end_zone: Option<CaptureZone>,
    span: Span,
}

impl<C: TrajectoryCollector> CaptureController<C> {
    /// Zones added later use `settings.target_radius`
    pub fn new(collector: C, settings: &CaptureSettings) -> Self {
        Self {
            collector,
            radius: settings.target_radius,
            start_zone: None,
            end_zone: None,
            span: tracing::debug_span!("capture"),
        }
    }

    /// Route this controller's log events under `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Only presses near `center` start a capture
    pub fn with_start_zone(mut self, center: Point) -> Self {
        self.start_zone = Some(CaptureZone::new(center, self.radius));
        self
    }

    /// Only releases near `center` complete a capture
    pub fn with_end_zone(mut self, center: Point) -> Self {
        self.end_zone = Some(CaptureZone::new(center, self.radius));
        self
    }

    pub fn start_zone(&self) -> Option<CaptureZone> {
        self.start_zone
    }

    pub fn end_zone(&self) -> Option<CaptureZone> {
        self.end_zone
    }

    pub fn collector(&self) -> &C {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> &mut C {
        &mut self.collector
    }

    /// Whether a gesture is in progress
    pub fn is_capturing(&self) -> bool {
        self.collector.is_active()
    }

    /// Feed one event
    pub fn handle(&mut self, event: InputEvent) -> Option<CaptureOutcome> {
        match event {
            InputEvent::Press(position) => {
                if self.collector.is_active() {
                    return None;
                }
                if self.start_zone.is_some_and(|zone| !zone.contains(&position)) {
                    tracing::debug!(parent: &self.span, x = position.x, y = position.y, "press outside start zone");
                    return None;
                }
                self.collector.start_capture(position);
                None
            }
            InputEvent::Move(position) => {
                self.collector.record(position);
                None
            }
            InputEvent::Release(position) => {
                if !self.collector.is_active() {
                    return None;
                }
                if self.end_zone.is_some_and(|zone| !zone.contains(&position)) {
                    self.collector.reset();
                    tracing::info!(parent: &self.span, x = position.x, y = position.y, "released outside end zone, capture abandoned");
                    return Some(CaptureOutcome::Abandoned { release: position });
                }
                Some(match self.collector.finish_capture(position) {
                    Ok(trajectory) => CaptureOutcome::Completed(trajectory),
                    Err(e) => {
                        tracing::warn!(parent: &self.span, error = %e, "capture rejected");
                        CaptureOutcome::Rejected(e)
                    }
                })
            }
        }
    }

    /// Drain `source` and feed every event, returning finished gestures
    pub fn pump(&mut self, source: &mut dyn EventSource) -> Vec<CaptureOutcome> {
        source
            .poll_events()
            .into_iter()
            .filter_map(|event| self.handle(event))
            .collect()
    }
}
