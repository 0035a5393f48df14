//! Who is signed in.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{AgendaError, AgendaResult};

/// The authenticated user every store path is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

/// Shared handle to the current identity.
///
/// Clones observe the same state, so a gateway built before sign-in sees
/// the user once they sign in.
#[derive(Clone)]
pub struct Session {
    current: Arc<watch::Sender<Option<Identity>>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl Session {
    pub fn anonymous() -> Self {
        let (current, _) = watch::channel(None);
        Session {
            current: Arc::new(current),
        }
    }

    pub fn authenticated(identity: Identity) -> Self {
        let session = Self::anonymous();
        session.sign_in(identity);
        session
    }

    pub fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|identity| identity.uid.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Current identity or `NotAuthenticated`.
    pub fn require(&self) -> AgendaResult<Identity> {
        self.current().ok_or(AgendaError::NotAuthenticated)
    }

    pub fn sign_in(&self, identity: Identity) {
        self.current.send_replace(Some(identity));
    }

    pub fn sign_out(&self) {
        self.current.send_replace(None);
    }

    /// Restore a session saved by [`Session::save`]; missing file means signed out.
    pub fn load(path: &Path) -> AgendaResult<Self> {
        if !path.exists() {
            return Ok(Self::anonymous());
        }

        let content = std::fs::read_to_string(path)?;
        let identity: Option<Identity> = serde_json::from_str(&content)?;

        Ok(match identity {
            Some(identity) => Self::authenticated(identity),
            None => Self::anonymous(),
        })
    }

    /// Persist the current identity, removing the file when signed out.
    pub fn save(&self, path: &Path) -> AgendaResult<()> {
        let Some(identity) = self.current() else {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&Some(identity))?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> Identity {
        Identity {
            uid: "U1".into(),
            email: "ana@x.com".into(),
        }
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::anonymous();
        let clone = session.clone();

        session.sign_in(ana());
        assert_eq!(clone.user_id().as_deref(), Some("U1"));

        clone.sign_out();
        assert!(!session.is_authenticated());
        assert!(matches!(session.require(), Err(AgendaError::NotAuthenticated)));
    }

    #[test]
    fn test_save_and_load_roundtrip_then_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let session = Session::authenticated(ana());
        session.save(&path).unwrap();
        assert_eq!(Session::load(&path).unwrap().current(), Some(ana()));

        session.sign_out();
        session.save(&path).unwrap();
        assert!(!path.exists());
        assert!(Session::load(&path).unwrap().current().is_none());
    }
}
