//! Construction helpers for clocks, stores and input channels

use pointer_replay::config::{Config, StorageSettings};
use pointer_replay::{ChannelEventSource, ExchangeDirectory, InputEvent, ManualClock};
use std::sync::Arc;
use tempfile::TempDir;

/// A manual clock plus the shared handle components receive
pub fn create_test_clock() -> (ManualClock, Arc<ManualClock>) {
    let clock = ManualClock::default();
    let shared = Arc::new(clock.clone());
    (clock, shared)
}

/// An exchange directory in a fresh temporary directory
///
/// Keep the returned `TempDir` alive for as long as the store is used.
pub fn create_test_store() -> (ExchangeDirectory, TempDir) {
    let dir = TempDir::new().unwrap();
    let settings = StorageSettings {
        exchange_dir: dir.path().join("csv_data"),
        ..Default::default()
    };
    (ExchangeDirectory::open(settings).unwrap(), dir)
}

/// Default configuration used by the integration tests
pub fn test_config() -> Config {
    Config::default()
}

/// Input channel as a producer thread would see it
pub fn create_test_input() -> (crossbeam_channel::Sender<InputEvent>, ChannelEventSource) {
    ChannelEventSource::channel()
}
