//! Access rules enforced on behalf of the signed-in user.
//!
//! Only two subtrees are visible to clients, and only to their owner:
//!
//! - `users/{uid}`
//! - `agendamentos/{uid}/...`
//!
//! Everything else (the credential namespace included) is denied.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{AgendaError, AgendaResult};
use crate::session::{Identity, Session};
use crate::store::{RecordStore, StorePath, Subscription};

pub const USERS_ROOT: &str = "users";
pub const APPOINTMENTS_ROOT: &str = "agendamentos";
pub const ACCOUNTS_ROOT: &str = "accounts";

const OWNED_ROOTS: [&str; 2] = [USERS_ROOT, APPOINTMENTS_ROOT];

/// Whether `identity` may read and write `path`.
pub fn check(identity: Option<&Identity>, path: &StorePath) -> AgendaResult<()> {
    let allowed = match (identity, path.segments()) {
        (Some(identity), [root, owner, ..]) => {
            OWNED_ROOTS.contains(&root.as_str()) && *owner == identity.uid
        }
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        tracing::warn!(
            path = %path,
            uid = identity.map(|i| i.uid.as_str()).unwrap_or("<anonymous>"),
            "access denied"
        );
        Err(AgendaError::AccessDenied(path.to_string()))
    }
}

/// A store view that applies [`check`] for the session's identity before
/// every operation.
pub struct GuardedStore {
    inner: Arc<dyn RecordStore>,
    session: Session,
}

impl GuardedStore {
    pub fn new(inner: Arc<dyn RecordStore>, session: Session) -> Self {
        GuardedStore { inner, session }
    }

    fn authorize(&self, path: &StorePath) -> AgendaResult<()> {
        check(self.session.current().as_ref(), path)
    }
}

#[async_trait]
impl RecordStore for GuardedStore {
    async fn get(&self, path: &StorePath) -> AgendaResult<Option<Value>> {
        self.authorize(path)?;
        self.inner.get(path).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> AgendaResult<()> {
        self.authorize(path)?;
        self.inner.set(path, value).await
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> AgendaResult<()> {
        self.authorize(path)?;
        self.inner.update(path, fields).await
    }

    async fn remove(&self, path: &StorePath) -> AgendaResult<()> {
        self.authorize(path)?;
        self.inner.remove(path).await
    }

    async fn push(&self, parent: &StorePath, value: Value) -> AgendaResult<String> {
        self.authorize(parent)?;
        self.inner.push(parent, value).await
    }

    fn subscribe(&self, path: &StorePath) -> AgendaResult<Subscription> {
        self.authorize(path)?;
        self.inner.subscribe(path)
    }
}
