//! In-process record store.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{RwLock, broadcast};

use super::{CHANGE_CHANNEL_CAPACITY, RecordStore, StorePath, Subscription, tree};
use crate::error::AgendaResult;
use crate::push_id::PushIdGenerator;

pub struct MemoryStore {
    tree: RwLock<Value>,
    changes: broadcast::Sender<StorePath>,
    ids: PushIdGenerator,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_tree(Value::Object(Map::new()))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(tree: Value) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        MemoryStore {
            tree: RwLock::new(tree),
            changes,
            ids: PushIdGenerator::new(),
        }
    }

    /// Copy of the whole tree.
    pub async fn snapshot(&self) -> Value {
        self.tree.read().await.clone()
    }

    /// Swap in a whole new tree, telling every subscriber.
    pub async fn replace(&self, tree: Value) {
        *self.tree.write().await = tree;
        self.notify(&StorePath::root());
    }

    /// Swap in a tree that already holds a write to `changed`.
    pub(crate) async fn install(&self, tree: Value, changed: &StorePath) {
        *self.tree.write().await = tree;
        self.notify(changed);
    }

    pub(crate) fn next_key(&self) -> String {
        self.ids.next_id()
    }

    fn notify(&self, path: &StorePath) {
        // No receivers is not an error.
        let _ = self.changes.send(path.clone());
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, path: &StorePath) -> AgendaResult<Option<Value>> {
        let tree = self.tree.read().await;
        Ok(tree::get(&tree, path).cloned())
    }

    async fn set(&self, path: &StorePath, value: Value) -> AgendaResult<()> {
        tree::set(&mut *self.tree.write().await, path, value);
        self.notify(path);
        Ok(())
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> AgendaResult<()> {
        tree::update(&mut *self.tree.write().await, path, fields)?;
        self.notify(path);
        Ok(())
    }

    async fn remove(&self, path: &StorePath) -> AgendaResult<()> {
        tree::remove(&mut *self.tree.write().await, path);
        self.notify(path);
        Ok(())
    }

    async fn push(&self, parent: &StorePath, value: Value) -> AgendaResult<String> {
        let key = self.next_key();
        let path = parent.child(&key)?;
        self.set(&path, value).await?;
        Ok(key)
    }

    fn subscribe(&self, path: &StorePath) -> AgendaResult<Subscription> {
        Ok(Subscription::new(path.clone(), self.changes.subscribe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn path(s: &str) -> StorePath {
        StorePath::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_push_returns_key_of_stored_child() {
        let store = MemoryStore::new();
        let parent = path("agendamentos/u1");

        let key = store.push(&parent, json!({"time": "10:00"})).await.unwrap();
        let stored = store.get(&parent.child(&key).unwrap()).await.unwrap();

        assert_eq!(stored, Some(json!({"time": "10:00"})));
    }

    #[tokio::test]
    async fn test_subscription_only_sees_overlapping_writes() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe(&path("agendamentos/u1")).unwrap();

        store.set(&path("agendamentos/u2/x"), json!(1)).await.unwrap();
        store.set(&path("agendamentos/u1/y"), json!(2)).await.unwrap();

        let changed = tokio::time::timeout(Duration::from_secs(1), sub.changed())
            .await
            .unwrap();
        assert_eq!(changed, Some(path("agendamentos/u1/y")));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get(&path("users/nobody")).await.unwrap(), None);
    }
}
