//! Keyed record store.
//!
//! The store is a single JSON tree addressed by [`StorePath`]s. Gateways only
//! talk to it through the [`RecordStore`] trait so the backend can be swapped
//! (in-memory for tests, a JSON document on disk for the CLI and server).

mod file;
mod memory;
mod path;
pub(crate) mod tree;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use path::StorePath;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::error::AgendaResult;

/// Capacity of the change-notification channel. Slow subscribers that fall
/// further behind are told something changed rather than what changed.
pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the node at `path`, `None` if nothing is stored there.
    async fn get(&self, path: &StorePath) -> AgendaResult<Option<Value>>;

    /// Replace the node at `path`. Writing `Value::Null` deletes it.
    async fn set(&self, path: &StorePath, value: Value) -> AgendaResult<()>;

    /// Merge `fields` into the node at `path` (one level deep).
    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> AgendaResult<()>;

    /// Delete the node at `path`. Deleting a missing node succeeds.
    async fn remove(&self, path: &StorePath) -> AgendaResult<()>;

    /// Store `value` under a freshly generated child key of `parent` and
    /// return that key.
    async fn push(&self, parent: &StorePath, value: Value) -> AgendaResult<String>;

    /// Watch for writes that touch `path` or anything below it.
    fn subscribe(&self, path: &StorePath) -> AgendaResult<Subscription>;
}

/// Standing registration for change notifications under a path.
///
/// Dropping the subscription deregisters it.
pub struct Subscription {
    path: StorePath,
    receiver: broadcast::Receiver<StorePath>,
}

impl Subscription {
    pub(crate) fn new(path: StorePath, receiver: broadcast::Receiver<StorePath>) -> Self {
        Subscription { path, receiver }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Wait until a write touches the watched path.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<StorePath> {
        loop {
            match self.receiver.recv().await {
                Ok(changed) if changed.overlaps(&self.path) => return Some(changed),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(path = %self.path, skipped, "subscriber lagged, forcing refresh");
                    return Some(self.path.clone());
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
