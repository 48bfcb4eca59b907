//! JSONL progress log.
//!
//! One JSON object per sampling checkpoint, appended and flushed immediately
//! so a dashboard can tail the file while training runs.

use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{RnnError, RnnResult};

/// Progress at a sampling checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressEvent {
    pub iteration: usize,
    pub loss: f64,
    pub smooth_loss: f64,
    pub sample: String,
}

/// Append-only JSONL writer.
#[derive(Debug)]
pub struct MetricsLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl MetricsLog {
    /// Open `path` for appending, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> RnnResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RnnError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| RnnError::io(&path, e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&mut self, event: &ProgressEvent) -> RnnResult<()> {
        let line = serde_json::to_string(event)
            .map_err(|e| RnnError::io(&self.path, std::io::Error::from(e)))?;
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|e| RnnError::io(&self.path, e))
    }
}
