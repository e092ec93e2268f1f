// # File Snapshot Store
//
// File-based implementation of SnapshotStore.
//
// ## Purpose
//
// Persists the observed snapshot across runs. The absence of the file is
// meaningful: it marks the next run as the bootstrap run.
//
// ## Durability
//
// - Atomic writes: new state is written to a temporary file, then renamed
// - Wholesale replace: the document is rewritten completely on every save
// - Permissive load: a malformed document logs a warning and loads as an
//   empty snapshot, so one corrupted write never wedges the monitor
//
// ## File Format
//
// ```json
// {
//   "doctors": {
//     "A123": {
//       "id": "A123",
//       "first_name": "Maria",
//       "last_name": "Rossi",
//       "availability": "Disponibile"
//     }
//   },
//   "location_cache": {
//     "A123": { "locations": ["ARCO"], "timestamp": 1722945600 }
//   }
// }
// ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::Error;
use crate::model::Snapshot;
use crate::traits::SnapshotStore;

/// File-based snapshot store with atomic writes
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store backed by the given file path.
    ///
    /// The file itself is not created until the first [`save`]; its
    /// absence is what signals a bootstrap run.
    ///
    /// [`save`]: SnapshotStore::save
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path to the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>, Error> {
        if !self.path.exists() {
            debug!("snapshot file does not exist: {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::snapshot_store(format!(
                "failed to read snapshot file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snapshot) => {
                debug!(
                    "loaded snapshot from {}: {} doctors, {} cached locations",
                    self.path.display(),
                    snapshot.doctors.len(),
                    snapshot.location_cache.len()
                );
                Ok(Some(snapshot))
            }
            Err(e) => {
                // The file exists, so this is not a bootstrap run; the run
                // proceeds in steady state against an empty baseline.
                warn!(
                    "failed to parse snapshot file {}: {}. Starting with empty state.",
                    self.path.display(),
                    e
                );
                Ok(Some(Snapshot::default()))
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::snapshot_store(format!(
                    "failed to create snapshot directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| Error::snapshot_store(format!("failed to serialize snapshot: {}", e)))?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::snapshot_store(format!(
                    "failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::snapshot_store(format!(
                    "failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::snapshot_store(format!(
                    "failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::snapshot_store(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        debug!("snapshot written to {}", self.path.display());
        Ok(())
    }
}
