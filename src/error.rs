//! Error handling for pointer-replay
//!
//! This module defines the crate's error type and a Result alias for use
//! throughout capture, persistence and playback.
//!
//! Invalid control calls (pausing a stopped player, recording while idle) are
//! not errors; they are silently ignored by the components.

use thiserror::Error;

/// Main error type for pointer-replay operations
#[derive(Error, Debug)]
pub enum TrajectoryError {
    /// A capture session ended with too few samples to form a trajectory
    #[error("Collection error: captured {count} sample(s), at least 2 are required")]
    Collection { count: usize },

    /// A row file could not be decoded; nothing partial is returned
    #[error("Decode error at line {line}: {message}")]
    Decode { line: u64, message: String },

    /// A sample violates the data model (negative or non-finite values)
    #[error("Invalid sample {index}: {message}")]
    InvalidSample { index: usize, message: String },

    /// Derived metadata is inconsistent or could not be built
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Errors related to configuration loading/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to the exchange directory
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Row format errors raised by the CSV layer
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<TrajectoryError>,
    },
}

impl TrajectoryError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        TrajectoryError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a decode error for a 1-based line number
    pub fn decode(line: u64, message: impl Into<String>) -> Self {
        TrajectoryError::Decode {
            line,
            message: message.into(),
        }
    }

    /// Whether this error (or the error it wraps) is a collection failure
    pub fn is_collection(&self) -> bool {
        match self {
            TrajectoryError::Collection { .. } => true,
            TrajectoryError::WithContext { source, .. } => source.is_collection(),
            _ => false,
        }
    }
}

/// Result type alias for pointer-replay operations
pub type Result<T> = std::result::Result<T, TrajectoryError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| TrajectoryError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| TrajectoryError::Io(e).with_context(f()))
    }
}
