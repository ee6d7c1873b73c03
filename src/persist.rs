//! Durable session snapshots: capture, background saves, restore

use crate::catalog::MediaItem;
use crate::domain::SessionState;
use crate::error::{Result, SweepError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Bumped whenever the snapshot layout changes; mismatched records are
/// discarded on restore instead of being reinterpreted.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The flat record written to durable storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub index: usize,
    pub current_locator: Option<String>,
    pub pending_locators: BTreeSet<String>,
    pub filter: String,
}

impl SessionSnapshot {
    /// Snapshots the session with a cursor clamped into current bounds, so
    /// identical state always yields an identical record regardless of
    /// which save path runs it.
    pub fn capture(state: &SessionState) -> Self {
        let index = if state.is_empty() {
            0
        } else {
            state.cursor().min(state.len() - 1)
        };

        SessionSnapshot {
            version: SNAPSHOT_VERSION,
            index,
            current_locator: state.current_item().map(|item| item.locator.to_string()),
            pending_locators: state
                .pending_trash
                .iter()
                .map(|locator| locator.to_string())
                .collect(),
            filter: state.filter.as_str().to_string(),
        }
    }

    /// Seats the cursor against a freshly loaded item list.
    ///
    /// Locator identity wins over the stored index: the catalog may have
    /// been reordered or grown between sessions. The index is the fallback
    /// when the exact item is gone; an empty list seats at 0.
    pub fn resolve_cursor(&self, items: &[MediaItem]) -> usize {
        if let Some(wanted) = &self.current_locator {
            if let Some(position) = items
                .iter()
                .position(|item| item.locator.as_str() == wanted)
            {
                return position;
            }
        }
        if items.is_empty() {
            0
        } else {
            self.index.min(items.len() - 1)
        }
    }
}

/// One durable record slot. The storage mechanism behind it is not this
/// crate's concern; implementations just hold a single serialized snapshot.
pub trait SnapshotStore: Send + Sync {
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, record: &str) -> Result<()>;
}

/// Snapshot storage as a JSON file under the platform config dir
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<config dir>/picsweep/session.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("picsweep").join("session.json"))
    }
}

impl SnapshotStore for JsonFileStore {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| SweepError::Persistence(format!("Failed to read session file: {}", e)))
    }

    fn write(&self, record: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SweepError::Persistence(format!("Failed to create session directory: {}", e))
            })?;
        }
        fs::write(&self.path, record)
            .map_err(|e| SweepError::Persistence(format!("Failed to write session file: {}", e)))
    }
}

enum SaveRequest {
    Save(SessionSnapshot),
    Flush(SessionSnapshot, oneshot::Sender<()>),
}

/// Durably records session snapshots without blocking the decision path.
///
/// Routine saves go through a background worker that drains its queue to
/// the newest snapshot before writing (latest-wins). The teardown path
/// uses [`flush_blocking`](Self::flush_blocking), which completes before
/// returning. Write failures are logged and swallowed; the in-memory
/// session stays authoritative either way.
pub struct PersistenceBridge {
    store: Arc<dyn SnapshotStore>,
    request_tx: mpsc::UnboundedSender<SaveRequest>,
    runtime: tokio::runtime::Runtime,
}

impl PersistenceBridge {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
        let (request_tx, request_rx) = mpsc::unbounded_channel();

        let worker_store = Arc::clone(&store);
        runtime.spawn(async move {
            Self::worker(request_rx, worker_store).await;
        });

        Self {
            store,
            request_tx,
            runtime,
        }
    }

    /// Background worker: waits for a request, drains everything else
    /// already queued so only the newest snapshot is written
    async fn worker(
        mut request_rx: mpsc::UnboundedReceiver<SaveRequest>,
        store: Arc<dyn SnapshotStore>,
    ) {
        while let Some(request) = request_rx.recv().await {
            let mut acks = Vec::new();
            let mut latest = match request {
                SaveRequest::Save(snapshot) => snapshot,
                SaveRequest::Flush(snapshot, ack) => {
                    acks.push(ack);
                    snapshot
                }
            };

            while let Ok(request) = request_rx.try_recv() {
                match request {
                    SaveRequest::Save(snapshot) => latest = snapshot,
                    SaveRequest::Flush(snapshot, ack) => {
                        acks.push(ack);
                        latest = snapshot;
                    }
                }
            }

            write_record(&*store, &latest);

            for ack in acks {
                let _ = ack.send(());
            }
        }
    }

    /// Queues a fire-and-forget save of the given snapshot
    pub fn schedule_save(&self, snapshot: SessionSnapshot) {
        let _ = self.request_tx.send(SaveRequest::Save(snapshot));
    }

    /// Saves synchronously; returns once the record is on disk. Falls back
    /// to a direct write if the worker is gone or slow.
    pub fn flush_blocking(&self, snapshot: SessionSnapshot) {
        let (ack_tx, ack_rx) = oneshot::channel();

        if self
            .request_tx
            .send(SaveRequest::Flush(snapshot.clone(), ack_tx))
            .is_ok()
        {
            let acked = self.runtime.block_on(async {
                tokio::time::timeout(std::time::Duration::from_secs(2), ack_rx)
                    .await
                    .is_ok()
            });
            if acked {
                return;
            }
        }

        write_record(&*self.store, &snapshot);
    }

    /// Reads the persisted snapshot, if any. Malformed records and version
    /// mismatches are discarded; the session just starts fresh.
    pub fn restore(&self) -> Option<SessionSnapshot> {
        let record = match self.store.read() {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted session");
                return None;
            }
        };

        let snapshot: SessionSnapshot = match serde_json::from_str(&record) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed persisted session");
                return None;
            }
        };

        if snapshot.version != SNAPSHOT_VERSION {
            tracing::warn!(
                version = snapshot.version,
                "discarding persisted session with unknown version"
            );
            return None;
        }

        Some(snapshot)
    }
}

fn write_record(store: &dyn SnapshotStore, snapshot: &SessionSnapshot) {
    let record = match serde_json::to_string(snapshot) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize session snapshot");
            return;
        }
    };
    if let Err(e) = store.write(&record) {
        tracing::warn!(error = %e, "failed to persist session snapshot");
    }
}
