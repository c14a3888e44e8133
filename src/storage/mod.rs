//! Persistence of trajectories
//!
//! - [`codec`] - the row format (encode/decode, rounding, cumulative rebuild)
//! - [`metadata`] - the JSON sidecar and its lenient fallback
//! - [`exchange`] - the shared exchange directory with atomic writes

pub mod codec;
pub mod exchange;
pub mod metadata;

pub use codec::{decode, encode, read_rows, write_rows};
pub use exchange::{artifact_name, sidecar_path, ExchangeDirectory, TrajectoryStore};
pub use metadata::{MetadataSource, ResolvedMetadata};
