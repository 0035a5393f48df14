//! Record store persisted as one JSON document.

use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;
use std::time::SystemTime;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{MemoryStore, RecordStore, StorePath, Subscription, tree};
use crate::error::{AgendaError, AgendaResult};

/// The whole tree lives in memory and is rewritten to disk on every
/// mutation (write to a temp file, then rename). A write becomes visible to
/// readers and subscribers only once it is on disk.
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
    write_lock: Mutex<()>,
    /// mtime of the document as last read or written by this process.
    modified: StdMutex<Option<SystemTime>>,
}

async fn read_tree(path: &Path) -> AgendaResult<Value> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(Value::Object(Map::new())),
        Ok(content) => serde_json::from_str(&content).map_err(|e| {
            AgendaError::Store(format!("Failed to parse {}: {}", path.display(), e))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Value::Object(Map::new())),
        Err(e) => Err(e.into()),
    }
}

async fn mtime(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

impl FileStore {
    /// Open the document at `path`, starting empty if it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> AgendaResult<Self> {
        let path = path.into();
        let tree = read_tree(&path).await?;
        let modified = mtime(&path).await;

        tracing::debug!(path = %path.display(), "opened record store");

        Ok(FileStore {
            path,
            inner: MemoryStore::with_tree(tree),
            write_lock: Mutex::new(()),
            modified: StdMutex::new(modified),
        })
    }

    /// Re-read the document if another process rewrote it since we last
    /// touched it. Subscribers are notified when it did.
    pub async fn reload_if_changed(&self) -> AgendaResult<bool> {
        let _guard = self.write_lock.lock().await;

        let on_disk = mtime(&self.path).await;
        if on_disk.is_none() || on_disk == self.last_modified() {
            return Ok(false);
        }

        let tree = read_tree(&self.path).await?;
        self.inner.replace(tree).await;
        self.set_last_modified(on_disk);
        tracing::debug!(path = %self.path.display(), "reloaded record store");
        Ok(true)
    }

    fn last_modified(&self) -> Option<SystemTime> {
        *self.modified.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_last_modified(&self, modified: Option<SystemTime>) {
        *self.modified.lock().unwrap_or_else(|e| e.into_inner()) = modified;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `write` to a copy of the tree, save the copy, then swap it in.
    async fn commit(
        &self,
        changed: &StorePath,
        write: impl FnOnce(&mut Value) -> AgendaResult<()>,
    ) -> AgendaResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.inner.snapshot().await;
        write(&mut next)?;
        self.persist(&next).await?;
        self.inner.install(next, changed).await;
        Ok(())
    }

    async fn persist(&self, tree: &Value) -> AgendaResult<()> {
        let content = serde_json::to_string_pretty(tree)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        self.set_last_modified(mtime(&self.path).await);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn get(&self, path: &StorePath) -> AgendaResult<Option<Value>> {
        self.inner.get(path).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> AgendaResult<()> {
        self.commit(path, |root| {
            tree::set(root, path, value);
            Ok(())
        })
        .await
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> AgendaResult<()> {
        self.commit(path, |root| tree::update(root, path, fields)).await
    }

    async fn remove(&self, path: &StorePath) -> AgendaResult<()> {
        self.commit(path, |root| {
            tree::remove(root, path);
            Ok(())
        })
        .await
    }

    async fn push(&self, parent: &StorePath, value: Value) -> AgendaResult<String> {
        let key = self.inner.next_key();
        let path = parent.child(&key)?;
        self.commit(&path, |root| {
            tree::set(root, &path, value);
            Ok(())
        })
        .await?;
        Ok(key)
    }

    fn subscribe(&self, path: &StorePath) -> AgendaResult<Subscription> {
        self.inner.subscribe(path)
    }
}
