//! Current user's profile at `users/{uid}`.

use std::sync::Arc;

use crate::error::{AgendaError, AgendaResult};
use crate::rules::USERS_ROOT;
use crate::session::Session;
use crate::store::{RecordStore, StorePath};
use crate::user::{User, UserPatch};

#[derive(Clone)]
pub struct ProfileGateway {
    store: Arc<dyn RecordStore>,
    session: Session,
}

pub(crate) fn profile_path(uid: &str) -> AgendaResult<StorePath> {
    StorePath::root().child(USERS_ROOT)?.child(uid)
}

impl ProfileGateway {
    pub fn new(store: Arc<dyn RecordStore>, session: Session) -> Self {
        ProfileGateway { store, session }
    }

    /// Signed-in user's profile; `None` when signed out or never written.
    pub async fn current(&self) -> AgendaResult<Option<User>> {
        let Some(uid) = self.session.user_id() else {
            return Ok(None);
        };

        self.store
            .get(&profile_path(&uid)?)
            .await?
            .map(|value| User::from_record(&uid, &value))
            .transpose()
    }

    pub async fn update(&self, patch: &UserPatch) -> AgendaResult<User> {
        let uid = self.session.require()?.uid;
        patch.validate()?;

        let path = profile_path(&uid)?;
        if self.store.get(&path).await?.is_none() {
            return Err(AgendaError::ProfileNotFound(uid));
        }

        let fields = patch.to_fields();
        if !fields.is_empty() {
            self.store.update(&path, fields).await?;
            tracing::info!(uid = %uid, "profile updated");
        }

        self.current()
            .await?
            .ok_or(AgendaError::ProfileNotFound(uid))
    }

    /// Remove the profile record. The account itself is removed through
    /// [`crate::auth::AuthService::delete_account`].
    pub async fn delete(&self) -> AgendaResult<()> {
        let uid = self.session.require()?.uid;
        self.store.remove(&profile_path(&uid)?).await?;
        tracing::info!(uid = %uid, "profile deleted");
        Ok(())
    }
}
