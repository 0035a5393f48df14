use std::path::PathBuf;
use std::sync::Arc;

use agenda_core::lock::DataDirLock;
use agenda_core::store::FileStore;
use agenda_core::{AgendaConfig, Backend, Identity, Session};
use anyhow::{Context, Result};

/// Whether a command writes to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Everything a command needs: the opened store and the saved session.
pub struct App {
    pub store: Arc<FileStore>,
    pub backend: Backend,
    pub session: Session,
    session_path: PathBuf,
    _lock: Option<DataDirLock>,
}

impl App {
    pub async fn open(access: Access) -> Result<Self> {
        let config = AgendaConfig::load()?;

        let lock = match access {
            Access::Write => Some(DataDirLock::acquire(&config.data_path())?),
            Access::Read => None,
        };

        let store_path = config.store_path();
        let store = Arc::new(
            FileStore::open(&store_path)
                .await
                .with_context(|| format!("Failed to open {}", store_path.display()))?,
        );
        let backend = Backend::new(store.clone(), config.booking.clone());

        let session_path = config.session_path();
        let session = Session::load(&session_path)?;

        Ok(App {
            store,
            backend,
            session,
            session_path,
            _lock: lock,
        })
    }

    /// Persist the session after sign-in or sign-out.
    pub fn save_session(&self) -> Result<()> {
        self.session.save(&self.session_path)?;
        Ok(())
    }

    pub fn require_login(&self) -> Result<Identity> {
        self.session.current().ok_or_else(|| {
            anyhow::anyhow!(
                "Not signed in.\n\n\
                Sign in with:\n  \
                agenda login\n\n\
                Or create an account with:\n  \
                agenda register"
            )
        })
    }
}
