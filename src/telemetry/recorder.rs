//! # Telemetry Recorder
//!
//! Appends normalized snapshots to rotating JSONL files.
//!
//! Each line is one snapshot with an RFC 3339 `timestamp` field. Files are
//! named `telemetry_<YYYYMMDD_HHMMSS>_<seq>.jsonl` so lexical order matches
//! creation order; once more than `max_files_to_keep` exist, the oldest are
//! removed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::RecordingConfig;
use crate::error::{GroundLinkError, Result};
use crate::telemetry::snapshot::TelemetrySnapshot;

const FILE_PREFIX: &str = "telemetry_";
const FILE_SUFFIX: &str = ".jsonl";

#[derive(Serialize)]
struct RecordLine<'a> {
    timestamp: String,
    #[serde(flatten)]
    snapshot: &'a TelemetrySnapshot,
}

/// Rotating JSONL snapshot writer
pub struct TelemetryRecorder {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
    sequence: u64,
}

impl std::fmt::Debug for TelemetryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryRecorder")
            .field("dir", &self.dir)
            .field("current_path", &self.current_path)
            .field("records_in_file", &self.records_in_file)
            .finish_non_exhaustive()
    }
}

impl TelemetryRecorder {
    /// Create a recorder writing into `config.log_dir`.
    ///
    /// The directory is created if missing. No file is opened until the
    /// first record arrives.
    ///
    /// # Errors
    ///
    /// Returns error if the log directory cannot be created
    pub fn new(config: &RecordingConfig) -> Result<Self> {
        let dir = PathBuf::from(&config.log_dir);
        fs::create_dir_all(&dir)?;
        info!("Recording telemetry to {}", dir.display());

        Ok(Self {
            dir,
            max_records_per_file: config.max_records_per_file.max(1),
            max_files_to_keep: config.max_files_to_keep.max(1),
            writer: None,
            current_path: None,
            records_in_file: 0,
            sequence: 0,
        })
    }

    /// Append one snapshot stamped with the current time.
    pub fn record(&mut self, snapshot: &TelemetrySnapshot) -> Result<()> {
        self.record_at(snapshot, Utc::now())
    }

    /// Append one snapshot stamped with `at`.
    pub fn record_at(&mut self, snapshot: &TelemetrySnapshot, at: DateTime<Utc>) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate(at)?;
        }

        let line = serde_json::to_string(&RecordLine {
            timestamp: at.to_rfc3339(),
            snapshot,
        })?;

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| GroundLinkError::Recorder("no open log file".to_string()))?;
        writeln!(writer, "{}", line)?;

        self.records_in_file += 1;
        Ok(())
    }

    /// Push buffered lines to disk.
    ///
    /// Also done on rotation and when the recorder is dropped.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Path of the file currently being written, if any.
    pub fn current_file(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    fn rotate(&mut self, at: DateTime<Utc>) -> Result<()> {
        if let Some(mut old) = self.writer.take() {
            old.flush()?;
        }

        self.sequence += 1;
        let name = format!(
            "{}{}_{:04}{}",
            FILE_PREFIX,
            at.format("%Y%m%d_%H%M%S"),
            self.sequence,
            FILE_SUFFIX
        );
        let path = self.dir.join(name);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Opened telemetry log {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.current_path = Some(path);
        self.records_in_file = 0;

        self.prune()
    }

    fn prune(&self) -> Result<()> {
        let mut files = log_files(&self.dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove old telemetry log {}: {}", path.display(), e);
            } else {
                debug!("Removed old telemetry log {}", path.display());
            }
        }
        Ok(())
    }
}

impl Drop for TelemetryRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush telemetry log: {}", e);
        }
    }
}

/// Recorder-owned files in `dir`
fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX))
            .unwrap_or(false);
        if is_log && path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
