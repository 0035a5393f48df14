//! Connection handle handed to every front end.
//!
//! There is no process-wide client: binaries open a [`Backend`] once and pass
//! it (or gateways built from it) to whatever needs the store.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::AuthService;
use crate::config::{AgendaConfig, BookingConfig};
use crate::error::AgendaResult;
use crate::gateway::AppointmentGateway;
use crate::profile::ProfileGateway;
use crate::rules::GuardedStore;
use crate::session::Session;
use crate::store::{FileStore, MemoryStore, RecordStore};

#[derive(Clone)]
pub struct Backend {
    store: Arc<dyn RecordStore>,
    booking: BookingConfig,
    registrations: Arc<Mutex<()>>,
}

impl Backend {
    pub fn new(store: Arc<dyn RecordStore>, booking: BookingConfig) -> Self {
        Backend {
            store,
            booking,
            registrations: Arc::default(),
        }
    }

    /// Backend over the JSON document in the configured data directory.
    pub async fn open(config: &AgendaConfig) -> AgendaResult<Self> {
        let store = FileStore::open(config.store_path()).await?;
        Ok(Self::new(Arc::new(store), config.booking.clone()))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), BookingConfig::default())
    }

    pub fn booking(&self) -> &BookingConfig {
        &self.booking
    }

    /// Store view restricted to what `session` may touch.
    pub fn guarded(&self, session: &Session) -> Arc<dyn RecordStore> {
        Arc::new(GuardedStore::new(self.store.clone(), session.clone()))
    }

    pub fn auth(&self, session: &Session) -> AuthService {
        AuthService::new(
            self.store.clone(),
            session.clone(),
            self.registrations.clone(),
        )
    }

    pub fn appointments(&self, session: &Session) -> AppointmentGateway {
        AppointmentGateway::new(self.guarded(session), session.clone(), self.booking.clone())
    }

    pub fn profiles(&self, session: &Session) -> ProfileGateway {
        ProfileGateway::new(self.guarded(session), session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::AppointmentDraft;
    use crate::user::NewUser;

    #[tokio::test]
    async fn test_two_users_never_see_each_other() {
        let backend = Backend::in_memory();

        let ana_session = Session::anonymous();
        backend
            .auth(&ana_session)
            .register(
                NewUser {
                    name: "Ana".into(),
                    email: "ana@x.com".into(),
                    ..Default::default()
                },
                "segredo1",
            )
            .await
            .unwrap();

        let bia_session = Session::anonymous();
        backend
            .auth(&bia_session)
            .register(
                NewUser {
                    name: "Bia".into(),
                    email: "bia@x.com".into(),
                    ..Default::default()
                },
                "segredo2",
            )
            .await
            .unwrap();

        let draft = AppointmentDraft {
            client_name: "Ana".into(),
            service_name: "Haircut".into(),
            date: "2025-01-10".into(),
            time: "14:00".into(),
            ..Default::default()
        };
        let id = backend.appointments(&ana_session).create(&draft).await.unwrap();

        assert_eq!(backend.appointments(&ana_session).list().await.unwrap().len(), 1);
        assert!(backend.appointments(&bia_session).list().await.unwrap().is_empty());
        assert_eq!(backend.appointments(&bia_session).get(&id).await.unwrap(), None);

        let profile = backend.profiles(&bia_session).current().await.unwrap().unwrap();
        assert_eq!(profile.name, "Bia");
    }
}
