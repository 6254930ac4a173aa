use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::Track;

use super::kv::KeyValueStore;

/// Storage key of the persisted queue.
///
/// The blob carries no schema version field; the key name is the only hint.
pub const QUEUE_STORAGE_KEY: &str = "player_queue_v1";

/// Persisted `{queue, currentIndex}` record. `current_index` is `-1` when the
/// queue is empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub queue: Vec<Track>,
    #[serde(default = "missing_index", deserialize_with = "lenient_index")]
    pub current_index: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    queue: &'a [Track],
    current_index: i64,
}

fn missing_index() -> i64 {
    -1
}

/// Any non-integer index reads as `-1`; the store clamps it on restore.
fn lenient_index<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(v.as_i64().unwrap_or(-1))
}

enum WriteCmd {
    Put(String),
    Flush(Sender<()>),
}

/// Best-effort bridge between the player store and a `KeyValueStore`.
///
/// Saves are serialised on the caller and written on a background thread in
/// FIFO order. Nothing here ever returns an error to its caller.
pub struct QueuePersistence {
    store: Arc<dyn KeyValueStore>,
    tx: Option<Sender<WriteCmd>>,
    writer: Option<JoinHandle<()>>,
}

impl QueuePersistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (tx, rx) = mpsc::channel::<WriteCmd>();
        let writer_store = store.clone();
        let writer = thread::Builder::new()
            .name("queue-writer".into())
            .spawn(move || {
                for cmd in rx {
                    match cmd {
                        WriteCmd::Put(json) => {
                            if let Err(e) = writer_store.set(QUEUE_STORAGE_KEY, &json) {
                                tracing::warn!(error = %e, "failed to persist queue");
                            }
                        }
                        WriteCmd::Flush(done) => {
                            let _ = done.send(());
                        }
                    }
                }
            });

        let writer = match writer {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "queue writer unavailable, persistence disabled");
                None
            }
        };
        let tx = writer.as_ref().map(|_| tx);

        Self {
            store,
            tx,
            writer,
        }
    }

    /// Queue a write of `{queue, current_index}`. Returns immediately.
    pub fn save(&self, queue: &[Track], current_index: Option<usize>) {
        let snapshot = SnapshotRef {
            queue,
            current_index: current_index.map_or(-1, |i| i as i64),
        };
        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialise queue snapshot");
                return;
            }
        };
        if let Some(tx) = &self.tx {
            if tx.send(WriteCmd::Put(json)).is_err() {
                tracing::warn!("queue writer stopped, snapshot dropped");
            }
        }
    }

    /// Read the persisted snapshot. Missing, unreadable or malformed data
    /// all read as `None`.
    pub fn load(&self) -> Option<QueueSnapshot> {
        let raw = match self.store.get(QUEUE_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted queue");
                return None;
            }
        };

        match serde_json::from_str::<QueueSnapshot>(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed persisted queue");
                None
            }
        }
    }

    /// Block until every save queued so far has reached the store.
    pub fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (done_tx, done_rx) = mpsc::channel();
        if tx.send(WriteCmd::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }
}

impl Drop for QueuePersistence {
    fn drop(&mut self) {
        // Closing the channel lets the writer drain what is queued and exit.
        self.tx.take();
        if let Some(h) = self.writer.take() {
            let _ = h.join();
        }
    }
}
