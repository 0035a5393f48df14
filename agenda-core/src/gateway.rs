//! Appointment store gateway.
//!
//! The only code that knows where appointments live in the store. Every
//! operation is scoped to `agendamentos/{uid}` of the session's identity.

use std::sync::Arc;

use crate::appointment::{Appointment, AppointmentDraft, AppointmentPatch};
use crate::config::BookingConfig;
use crate::error::{AgendaError, AgendaResult};
use crate::rules::APPOINTMENTS_ROOT;
use crate::session::Session;
use crate::store::{RecordStore, StorePath, Subscription};

#[derive(Clone)]
pub struct AppointmentGateway {
    store: Arc<dyn RecordStore>,
    session: Session,
    booking: BookingConfig,
}

fn namespace(uid: &str) -> AgendaResult<StorePath> {
    StorePath::root().child(APPOINTMENTS_ROOT)?.child(uid)
}

impl AppointmentGateway {
    pub fn new(store: Arc<dyn RecordStore>, session: Session, booking: BookingConfig) -> Self {
        AppointmentGateway {
            store,
            session,
            booking,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn booking(&self) -> &BookingConfig {
        &self.booking
    }

    fn record_path(&self, id: &str) -> AgendaResult<StorePath> {
        let uid = self.session.require()?.uid;
        namespace(&uid)?.child(id)
    }

    /// Validate and store a new appointment, returning its generated id.
    pub async fn create(&self, draft: &AppointmentDraft) -> AgendaResult<String> {
        let identity = self.session.require()?;
        draft.validate(&self.booking)?;

        let created_at = chrono::Utc::now().to_rfc3339();
        let id = self
            .store
            .push(&namespace(&identity.uid)?, draft.to_record(&created_at))
            .await?;

        tracing::info!(uid = %identity.uid, id = %id, "appointment created");
        Ok(id)
    }

    /// Snapshot of the signed-in user's appointments in creation order.
    /// Signed out means an empty list, not an error.
    pub async fn list(&self) -> AgendaResult<Vec<Appointment>> {
        match self.session.user_id() {
            Some(uid) => self.list_for(&uid).await,
            None => Ok(Vec::new()),
        }
    }

    async fn list_for(&self, uid: &str) -> AgendaResult<Vec<Appointment>> {
        let Some(node) = self.store.get(&namespace(uid)?).await? else {
            return Ok(Vec::new());
        };

        let mut appointments: Vec<Appointment> = node
            .as_object()
            .into_iter()
            .flatten()
            .filter_map(|(id, value)| match Appointment::from_record(id, value) {
                Ok(appointment) => Some(appointment),
                Err(e) => {
                    tracing::warn!(uid, id = %id, error = %e, "skipping unreadable appointment");
                    None
                }
            })
            .collect();

        appointments.sort_by(|a, b| a.id.cmp(&b.id));
        tracing::debug!(uid, count = appointments.len(), "listed appointments");
        Ok(appointments)
    }

    pub async fn get(&self, id: &str) -> AgendaResult<Option<Appointment>> {
        let path = self.record_path(id)?;
        self.store
            .get(&path)
            .await?
            .map(|value| Appointment::from_record(id, &value))
            .transpose()
    }

    /// Merge `patch` into an existing appointment. Field contents are not
    /// re-validated.
    pub async fn update(&self, id: &str, patch: &AppointmentPatch) -> AgendaResult<()> {
        let path = self.record_path(id)?;

        if self.store.get(&path).await?.is_none() {
            return Err(AgendaError::AppointmentNotFound(id.to_string()));
        }
        if patch.is_empty() {
            return Ok(());
        }

        self.store.update(&path, patch.to_fields()).await?;
        tracing::info!(id, "appointment updated");
        Ok(())
    }

    /// Remove by id. A stale id removes nothing and still succeeds.
    pub async fn delete(&self, id: &str) -> AgendaResult<()> {
        let path = self.record_path(id)?;
        self.store.remove(&path).await?;
        tracing::info!(id, "appointment deleted");
        Ok(())
    }

    /// Live view of the signed-in user's appointments.
    pub fn subscribe(&self) -> AgendaResult<LiveAppointments> {
        let uid = self.session.require()?.uid;
        let subscription = self.store.subscribe(&namespace(&uid)?)?;

        Ok(LiveAppointments {
            gateway: self.clone(),
            uid,
            subscription,
            primed: false,
        })
    }

    /// Rewrite records that still use old field names into the canonical
    /// schema. Returns how many were rewritten.
    pub async fn migrate_legacy(&self) -> AgendaResult<usize> {
        let uid = self.session.require()?.uid;
        let parent = namespace(&uid)?;

        let Some(node) = self.store.get(&parent).await? else {
            return Ok(0);
        };

        let mut migrated = 0;
        for (id, value) in node.as_object().into_iter().flatten() {
            if !Appointment::is_legacy_record(value) {
                continue;
            }
            let appointment = Appointment::from_record(id, value)?;
            self.store
                .set(&parent.child(id)?, appointment.to_record())
                .await?;
            migrated += 1;
        }

        if migrated > 0 {
            tracing::info!(uid = %uid, migrated, "migrated legacy appointments");
        }
        Ok(migrated)
    }
}

/// Push-based appointment list. Yields the current snapshot first, then a
/// fresh snapshot after every change, until dropped or unsubscribed.
pub struct LiveAppointments {
    gateway: AppointmentGateway,
    uid: String,
    subscription: Subscription,
    primed: bool,
}

impl LiveAppointments {
    /// Next snapshot, or `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<AgendaResult<Vec<Appointment>>> {
        if self.primed {
            self.subscription.changed().await?;
        }
        self.primed = true;
        Some(self.gateway.list_for(&self.uid).await)
    }

    pub fn unsubscribe(self) {
        tracing::debug!(uid = %self.uid, "live appointments unsubscribed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::GuardedStore;
    use crate::session::Identity;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::time::Duration;

    fn identity(uid: &str) -> Identity {
        Identity {
            uid: uid.into(),
            email: format!("{}@x.com", uid.to_lowercase()),
        }
    }

    fn gateway_on(store: &Arc<MemoryStore>, session: &Session) -> AppointmentGateway {
        let guarded = GuardedStore::new(store.clone(), session.clone());
        AppointmentGateway::new(Arc::new(guarded), session.clone(), BookingConfig::default())
    }

    fn ana_haircut() -> AppointmentDraft {
        AppointmentDraft {
            client_name: "Ana".into(),
            service_name: "Haircut".into(),
            staff_name: None,
            date: "2025-01-10".into(),
            time: "14:00".into(),
        }
    }

    #[tokio::test]
    async fn test_created_appointment_is_listed_only_for_its_owner() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::authenticated(identity("U1"));
        let gateway = gateway_on(&store, &session);

        let id = gateway.create(&ana_haircut()).await.unwrap();
        let listed = gateway.list().await.unwrap();

        assert_eq!(listed.len(), 1);
        let appt = &listed[0];
        assert_eq!(appt.id, id);
        assert!(!appt.id.is_empty());
        assert_eq!(appt.client_name, "Ana");
        assert_eq!(appt.service_name, "Haircut");
        assert_eq!(appt.date, "2025-01-10");
        assert_eq!(appt.time, "14:00");

        session.sign_in(identity("U2"));
        assert!(gateway.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_draft_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::authenticated(identity("U1"));
        let gateway = gateway_on(&store, &session);

        let draft = AppointmentDraft {
            service_name: String::new(),
            ..ana_haircut()
        };
        let err = gateway.create(&draft).await.unwrap_err();

        assert!(matches!(err, AgendaError::Validation(_)));
        assert_eq!(store.snapshot().await, json!({}));
    }

    #[tokio::test]
    async fn test_delete_then_list_omits_id() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::authenticated(identity("U1"));
        let gateway = gateway_on(&store, &session);

        let keep = gateway.create(&ana_haircut()).await.unwrap();
        let gone = gateway.create(&ana_haircut()).await.unwrap();
        gateway.delete(&gone).await.unwrap();

        let ids: Vec<_> = gateway.list().await.unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![keep]);
    }

    #[tokio::test]
    async fn test_delete_of_stale_id_succeeds_silently() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::authenticated(identity("U1"));
        let gateway = gateway_on(&store, &session);

        gateway.create(&ana_haircut()).await.unwrap();
        gateway.delete("1736500000000").await.unwrap();

        assert_eq!(gateway.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_changes_only_given_field() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::authenticated(identity("U1"));
        let gateway = gateway_on(&store, &session);

        let id = gateway.create(&ana_haircut()).await.unwrap();
        let before = gateway.get(&id).await.unwrap().unwrap();

        let patch = AppointmentPatch {
            time: Some("16:00".into()),
            ..Default::default()
        };
        gateway.update(&id, &patch).await.unwrap();

        let after = gateway.list().await.unwrap().remove(0);
        assert_eq!(after.time, "16:00");
        assert_eq!(
            after,
            Appointment {
                time: "16:00".into(),
                ..before
            }
        );
    }

    #[tokio::test]
    async fn test_clearing_staff_on_legacy_record_sticks() {
        let store = Arc::new(MemoryStore::new());
        let record = StorePath::parse("agendamentos/U1/-Nold").unwrap();
        store
            .set(
                &record,
                json!({"nomeCliente": "Carlos", "nomeCorte": "Degradê", "nomeBarbeador": "Zé", "hora": "09:00"}),
            )
            .await
            .unwrap();
        let session = Session::authenticated(identity("U1"));
        let gateway = gateway_on(&store, &session);

        let patch = AppointmentPatch {
            staff_name: Some(String::new()),
            ..Default::default()
        };
        gateway.update("-Nold", &patch).await.unwrap();

        let after = gateway.get("-Nold").await.unwrap().unwrap();
        assert_eq!(after.staff_name, None);
        assert_eq!(after.client_name, "Carlos");
        assert_eq!(gateway.list().await.unwrap()[0].staff_name, None);
        let stored = store.get(&record).await.unwrap().unwrap();
        assert!(stored.get("nomeBarbeador").is_none());
    }

    #[tokio::test]
    async fn test_update_of_missing_record_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::authenticated(identity("U1"));
        let gateway = gateway_on(&store, &session);

        let err = gateway
            .update("-Nmissing", &AppointmentPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgendaError::AppointmentNotFound(_)));
    }

    #[tokio::test]
    async fn test_signed_out_list_is_empty_and_writes_fail() {
        let store = Arc::new(MemoryStore::new());
        let gateway = gateway_on(&store, &Session::anonymous());

        assert!(gateway.list().await.unwrap().is_empty());
        assert!(matches!(
            gateway.create(&ana_haircut()).await,
            Err(AgendaError::NotAuthenticated)
        ));
        assert!(matches!(
            gateway.delete("x").await,
            Err(AgendaError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_migrate_rewrites_legacy_records_once() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                &StorePath::parse("agendamentos/U1/1736500000000").unwrap(),
                json!({"id": "1736500000000", "nome": "Rex", "servico": "Banho", "hora": "10:00"}),
            )
            .await
            .unwrap();
        let session = Session::authenticated(identity("U1"));
        let gateway = gateway_on(&store, &session);

        let listed = gateway.list().await.unwrap();
        assert_eq!(listed[0].client_name, "Rex");
        assert_eq!(listed[0].service_name, "Banho");

        assert_eq!(gateway.migrate_legacy().await.unwrap(), 1);
        assert_eq!(gateway.migrate_legacy().await.unwrap(), 0);

        let stored = store
            .get(&StorePath::parse("agendamentos/U1/1736500000000").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored,
            json!({"clientName": "Rex", "serviceName": "Banho", "date": "", "time": "10:00"})
        );
    }

    #[tokio::test]
    async fn test_live_subscription_pushes_snapshots() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::authenticated(identity("U1"));
        let gateway = gateway_on(&store, &session);

        let mut live = gateway.subscribe().unwrap();
        let first = live.next().await.unwrap().unwrap();
        assert!(first.is_empty());

        gateway.create(&ana_haircut()).await.unwrap();
        let second = tokio::time::timeout(Duration::from_secs(1), live.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(second.len(), 1);

        live.unsubscribe();
    }
}
