//! JSON epoch-log persistence for gridlife runs.

use gridlife_core::{EpochRecorder, EpochSnapshot, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

/// Storage error wrapper.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Run-level fields written once at the top of a log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunHeader {
    pub size: u32,
    pub population: usize,
    pub total_epochs: u64,
    /// Seconds since the Unix epoch at which the run started.
    pub started_at: u64,
}

impl RunHeader {
    /// Header for a run of `config` starting now.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        Self {
            size: config.size,
            population: config.population,
            total_epochs: config.epochs,
            started_at,
        }
    }

    /// Default file name for the log of this run.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.started_at)
    }
}

/// Header plus every recorded epoch, epoch 0 being the founders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpochLog {
    #[serde(flatten)]
    pub header: RunHeader,
    #[serde(rename = "epoch", default)]
    pub epochs: Vec<EpochSnapshot>,
}

impl EpochLog {
    #[must_use]
    pub fn new(header: RunHeader) -> Self {
        Self {
            header,
            epochs: Vec::new(),
        }
    }

    pub fn push(&mut self, snapshot: EpochSnapshot) {
        self.epochs.push(snapshot);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Most recent snapshot, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&EpochSnapshot> {
        self.epochs.last()
    }

    /// Serialize the log to `path`, replacing any existing file.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        debug!(path = %path.display(), epochs = self.epochs.len(), "wrote epoch log");
        Ok(())
    }

    /// Load a log previously written by [`EpochLog::write_json`].
    pub fn read_json(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Thread-safe handle to an [`EpochLog`] that can be installed as a world recorder
/// while the caller keeps a clone for writing the log out.
#[derive(Debug, Clone)]
pub struct SharedEpochLog {
    log: Arc<Mutex<EpochLog>>,
}

impl SharedEpochLog {
    #[must_use]
    pub fn new(header: RunHeader) -> Self {
        Self {
            log: Arc::new(Mutex::new(EpochLog::new(header))),
        }
    }

    /// Lock the log, recovering the data if a previous holder panicked.
    pub fn lock(&self) -> MutexGuard<'_, EpochLog> {
        match self.log.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("epoch log mutex poisoned; continuing with recovered data");
                poisoned.into_inner()
            }
        }
    }

    /// Copy of the log as recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> EpochLog {
        self.lock().clone()
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        self.lock().write_json(path)
    }
}

impl EpochRecorder for SharedEpochLog {
    fn on_epoch(&mut self, snapshot: &EpochSnapshot) {
        self.lock().push(snapshot.clone());
    }
}
