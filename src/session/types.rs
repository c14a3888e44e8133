//! Session state types

/// State of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// No capture in progress
    #[default]
    Idle,
    /// Samples are being appended
    Capturing,
}

impl CaptureState {
    /// Check if currently capturing
    pub fn is_capturing(&self) -> bool {
        matches!(self, CaptureState::Capturing)
    }
}

/// State of the playback clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Not started, or explicitly stopped/reset
    #[default]
    Stopped,
    /// Virtual time advances with wall time
    Playing,
    /// Virtual time is frozen; wall time spent here is pause time
    Paused,
    /// Virtual time ran past the last sample
    Finished,
}

impl PlaybackState {
    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    /// Check if paused
    pub fn is_paused(&self) -> bool {
        matches!(self, PlaybackState::Paused)
    }

    /// Check if playback reached the end
    pub fn is_finished(&self) -> bool {
        matches!(self, PlaybackState::Finished)
    }

    /// Whether a clock origin exists (anything but Stopped)
    pub fn has_origin(&self) -> bool {
        !matches!(self, PlaybackState::Stopped)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Finished => "Finished",
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
