//! Durable queue persistence.
//!
//! `kv` is the opaque string blob store; `gateway` turns queue snapshots into
//! blobs and back, swallowing every failure on the way.

mod gateway;
mod kv;

pub use gateway::{QUEUE_STORAGE_KEY, QueuePersistence, QueueSnapshot};
pub use kv::{FileStore, KeyValueStore};

#[cfg(test)]
pub(crate) use kv::MemoryStore;
