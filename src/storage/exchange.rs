//! Shared exchange directory
//!
//! Producers drop finished trajectories here and consumers enumerate and
//! read them. Each artifact is a row file plus a `.meta.json` sidecar; both
//! are written to a temporary file in the same directory and renamed into
//! place, so a reader never observes a half-written artifact.

use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::Span;

use crate::config::{StorageSettings, MIN_TRAJECTORY_POINTS};
use crate::error::{Result, ResultExt, TrajectoryError};
use crate::types::{Trajectory, CAPTURE_END_KEY, CAPTURE_ORIGIN_KEY};

use super::codec::{self, round_to};
use super::metadata::{self, MetadataSource};

/// Extension of row files
pub const ROWS_EXTENSION: &str = "csv";

/// Extension replacing the row extension for sidecars
pub const SIDECAR_EXTENSION: &str = "meta.json";

/// Capability interface for trajectory persistence
pub trait TrajectoryStore {
    /// Persist a trajectory, returning the path of its row file
    fn save(&self, trajectory: &Trajectory) -> Result<PathBuf>;

    /// Read a trajectory back
    fn load(&self, path: &Path) -> Result<Trajectory>;

    /// Enumerate stored row files
    fn list(&self) -> Result<Vec<PathBuf>>;
}

/// Sidecar path belonging to a row file
pub fn sidecar_path(rows: &Path) -> PathBuf {
    rows.with_extension(SIDECAR_EXTENSION)
}

/// File name for a trajectory: rounded endpoints plus a short fingerprint
///
/// Endpoints are the press and release positions recorded at capture time,
/// or the first and last samples when those are absent. The fingerprint
/// hashes the capture timestamp, point count and endpoints, so two captures
/// of the same path still get distinct names.
pub fn artifact_name(trajectory: &Trajectory, fingerprint_len: usize) -> String {
    let meta = trajectory.metadata();
    let start = meta
        .custom_point(CAPTURE_ORIGIN_KEY)
        .unwrap_or_else(|| trajectory.start_position());
    let end = meta
        .custom_point(CAPTURE_END_KEY)
        .unwrap_or_else(|| trajectory.end_position());
    let (sx, sy) = (round_to(start.x, 1), round_to(start.y, 1));
    let (ex, ey) = (round_to(end.x, 1), round_to(end.y, 1));

    let hash_input = format!(
        "{}{}{}{}{}{}",
        trajectory.metadata().start_time.to_rfc3339(),
        trajectory.len(),
        sx,
        sy,
        ex,
        ey
    );
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(hash_input.as_bytes());
    let hex = format!("{:08x}", hasher.finalize());
    let fingerprint = &hex[..fingerprint_len.clamp(1, hex.len())];

    format!(
        "X{:.1}Y{:.1}_X{:.1}Y{:.1}_{}.{}",
        sx, sy, ex, ey, fingerprint, ROWS_EXTENSION
    )
}

/// Directory-backed [`TrajectoryStore`]
#[derive(Debug)]
pub struct ExchangeDirectory {
    settings: StorageSettings,
    span: Span,
}

impl ExchangeDirectory {
    /// Use the configured exchange directory, creating it if needed
    pub fn open(settings: StorageSettings) -> Result<Self> {
        fs::create_dir_all(&settings.exchange_dir).with_context(|| {
            format!(
                "Failed to create exchange directory {}",
                settings.exchange_dir.display()
            )
        })?;
        Ok(Self {
            settings,
            span: tracing::debug_span!("exchange"),
        })
    }

    /// Route this store's log events under `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Get the directory root
    pub fn root(&self) -> &Path {
        &self.settings.exchange_dir
    }

    /// Bare file names resolve inside the directory, other paths as given
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.components().count() == 1 {
            self.root().join(path)
        } else {
            path.to_path_buf()
        }
    }

    /// The file `step` places after `current` in listing order, wrapping
    ///
    /// When `current` is not in the directory, stepping forward yields the
    /// first file and stepping backward the last.
    pub fn adjacent(&self, current: &Path, step: isize) -> Result<Option<PathBuf>> {
        let files = self.list()?;
        if files.is_empty() {
            return Ok(None);
        }

        let len = files.len() as isize;
        let index = match files.iter().position(|f| f.file_name() == current.file_name()) {
            Some(i) => (i as isize + step).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };
        Ok(files.into_iter().nth(index as usize))
    }

    fn write_atomic(&self, target: &Path, write: impl FnOnce(&mut fs::File) -> Result<()>) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(self.root())?;
        write(tmp.as_file_mut())?;
        tmp.as_file_mut().flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(target).map_err(|e| TrajectoryError::Io(e.error))?;
        Ok(())
    }

    fn anchor_time(path: &Path) -> DateTime<Utc> {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl TrajectoryStore for ExchangeDirectory {
    fn save(&self, trajectory: &Trajectory) -> Result<PathBuf> {
        if trajectory.len() < MIN_TRAJECTORY_POINTS {
            return Err(TrajectoryError::Collection {
                count: trajectory.len(),
            });
        }

        let path = self
            .root()
            .join(artifact_name(trajectory, self.settings.fingerprint_len));
        let sidecar = metadata::encode_sidecar(trajectory.metadata())?;

        // Sidecar first: a listed row file always has its sidecar in place
        self.write_atomic(&sidecar_path(&path), |file| {
            file.write_all(sidecar.as_bytes())?;
            Ok(())
        })
        .with_context(|| format!("Failed to write sidecar for {}", path.display()))?;

        if let Err(e) = self.write_atomic(&path, |file| codec::write_rows(trajectory, file)) {
            // Rows never landed, so the sidecar alone must not stay visible
            if let Err(cleanup) = fs::remove_file(sidecar_path(&path)) {
                tracing::warn!(parent: &self.span, path = %path.display(), error = %cleanup, "failed to remove orphan sidecar");
            }
            return Err(e.with_context(format!("Failed to write {}", path.display())));
        }

        tracing::info!(
            parent: &self.span,
            path = %path.display(),
            points = trajectory.len(),
            "trajectory saved"
        );
        Ok(path)
    }

    fn load(&self, path: &Path) -> Result<Trajectory> {
        let path = self.resolve(path);

        let size = fs::metadata(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?
            .len();
        let limit = self.settings.max_file_size_bytes();
        if size > limit {
            return Err(TrajectoryError::Storage(format!(
                "{} is {} bytes, larger than the {} byte limit",
                path.display(),
                size,
                limit
            )));
        }

        let rows = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let samples = codec::read_rows(rows.as_bytes())
            .with_context(|| format!("Failed to decode {}", path.display()))?;

        let sidecar = fs::read_to_string(sidecar_path(&path)).ok();
        let resolved = metadata::resolve(sidecar.as_deref(), &samples, Self::anchor_time(&path));
        match &resolved.source {
            MetadataSource::Sidecar => {}
            MetadataSource::Recomputed { reason: Some(reason) } => {
                tracing::warn!(parent: &self.span, path = %path.display(), reason = %reason, "ignoring unusable sidecar");
            }
            MetadataSource::Recomputed { reason: None } => {
                tracing::debug!(parent: &self.span, path = %path.display(), "no sidecar, metadata recomputed");
            }
        }

        let trajectory = Trajectory::with_metadata(samples, resolved.metadata)?;
        tracing::debug!(
            parent: &self.span,
            path = %path.display(),
            points = trajectory.len(),
            "trajectory loaded"
        );
        Ok(trajectory)
    }

    fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(self.root()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == ROWS_EXTENSION) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}
