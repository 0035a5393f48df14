//! Appointment list screen.

use crate::appointment::Appointment;
use crate::error::AgendaResult;
use crate::gateway::AppointmentGateway;
use crate::views::Alert;

/// Identifies one refresh so late completions can be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub id: String,
    pub title: String,
    pub message: String,
}

pub struct AppointmentList {
    gateway: AppointmentGateway,
    items: Vec<Appointment>,
    loading: bool,
    pending_delete: Option<DeletePrompt>,
    issued: u64,
    applied: u64,
}

impl AppointmentList {
    pub fn new(gateway: AppointmentGateway) -> Self {
        AppointmentList {
            gateway,
            items: Vec::new(),
            loading: false,
            pending_delete: None,
            issued: 0,
            applied: 0,
        }
    }

    pub fn gateway(&self) -> &AppointmentGateway {
        &self.gateway
    }

    pub fn items(&self) -> &[Appointment] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending_delete(&self) -> Option<&DeletePrompt> {
        self.pending_delete.as_ref()
    }

    /// Screen gained focus: reload everything.
    pub async fn on_focus(&mut self) -> Option<Alert> {
        let ticket = self.begin_refresh();
        let result = self.gateway.list().await;
        self.complete_refresh(ticket, result)
    }

    /// Mark a refresh as started. Pair with [`Self::complete_refresh`] when
    /// the list call runs elsewhere.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        self.loading = true;
        RefreshTicket(self.issued)
    }

    /// Apply the result of a refresh. A result older than one already
    /// applied is dropped so a slow request cannot overwrite a newer list.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: AgendaResult<Vec<Appointment>>,
    ) -> Option<Alert> {
        if ticket.0 == self.issued {
            self.loading = false;
        }
        if ticket.0 < self.applied {
            tracing::debug!(ticket = ticket.0, applied = self.applied, "dropping stale refresh");
            return None;
        }
        self.applied = ticket.0;

        match result {
            Ok(items) => {
                self.items = items;
                None
            }
            Err(e) => Some(Alert::from_error(&e)),
        }
    }

    /// Replace the list from a live subscription push.
    pub fn apply_snapshot(&mut self, items: Vec<Appointment>) {
        self.items = items;
        self.loading = false;
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: &str) -> &DeletePrompt {
        let label = self
            .items
            .iter()
            .find(|a| a.id == id)
            .map(|a| format!(" for {} at {}", a.client_name, a.time))
            .unwrap_or_default();

        self.pending_delete.insert(DeletePrompt {
            id: id.to_string(),
            title: "Confirm deletion".to_string(),
            message: format!("Are you sure you want to delete this appointment{label}?"),
        })
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the item awaiting confirmation. On success it is removed from
    /// the displayed list whether or not the store actually held it.
    pub async fn confirm_delete(&mut self) -> Option<Alert> {
        let prompt = self.pending_delete.take()?;

        match self.gateway.delete(&prompt.id).await {
            Ok(()) => {
                self.items.retain(|a| a.id != prompt.id);
                Some(Alert::success("Appointment deleted."))
            }
            Err(e) => Some(Alert::from_error(&e)),
        }
    }
}
