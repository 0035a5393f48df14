//! Appointment create/edit screen.

use crate::appointment::{Appointment, AppointmentDraft, AppointmentPatch};
use crate::error::AgendaResult;
use crate::gateway::AppointmentGateway;
use crate::views::Alert;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Appointment),
}

/// What the front end should do after a submit or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Write succeeded; return to the list.
    NavigateBack { id: String },
    /// Show the alert and keep the form as it is.
    Stay(Alert),
    /// A write is already in flight.
    Ignored,
}

/// A validated write, ready to send to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite {
    Create(AppointmentDraft),
    Update { id: String, patch: AppointmentPatch },
    Delete { id: String },
}

impl PendingWrite {
    /// Run the write and return the id of the affected appointment.
    pub async fn execute(&self, gateway: &AppointmentGateway) -> AgendaResult<String> {
        match self {
            PendingWrite::Create(draft) => gateway.create(draft).await,
            PendingWrite::Update { id, patch } => {
                gateway.update(id, patch).await?;
                Ok(id.clone())
            }
            PendingWrite::Delete { id } => {
                gateway.delete(id).await?;
                Ok(id.clone())
            }
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            PendingWrite::Create(_) => "Appointment created.",
            PendingWrite::Update { .. } => "Appointment updated.",
            PendingWrite::Delete { .. } => "Appointment deleted.",
        }
    }
}

pub struct AppointmentForm {
    gateway: AppointmentGateway,
    mode: FormMode,
    /// Field values as currently entered.
    pub draft: AppointmentDraft,
    submitting: bool,
}

impl AppointmentForm {
    pub fn create(gateway: AppointmentGateway) -> Self {
        AppointmentForm {
            gateway,
            mode: FormMode::Create,
            draft: AppointmentDraft::default(),
            submitting: false,
        }
    }

    /// Edit form prefilled from `appointment`.
    pub fn edit(gateway: AppointmentGateway, appointment: Appointment) -> Self {
        let draft = AppointmentDraft {
            client_name: appointment.client_name.clone(),
            service_name: appointment.service_name.clone(),
            staff_name: appointment.staff_name.clone(),
            date: appointment.date.clone(),
            time: appointment.time.clone(),
        };

        AppointmentForm {
            gateway,
            mode: FormMode::Edit(appointment),
            draft,
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn time_slots(&self) -> &[String] {
        &self.gateway.booking().time_slots
    }

    /// Validate the entered fields and lock the form for the write.
    pub fn begin_submit(&mut self) -> Result<PendingWrite, FormOutcome> {
        if self.submitting {
            return Err(FormOutcome::Ignored);
        }

        self.draft.date = self.draft.date.trim().replace('/', "-");
        if let Err(e) = self.draft.validate(self.gateway.booking()) {
            return Err(FormOutcome::Stay(Alert::from_error(&e)));
        }

        self.submitting = true;
        Ok(match &self.mode {
            FormMode::Create => PendingWrite::Create(self.draft.clone()),
            FormMode::Edit(current) => PendingWrite::Update {
                id: current.id.clone(),
                patch: AppointmentPatch::between(current, &self.draft),
            },
        })
    }

    /// Delete the appointment being edited. The caller confirms first.
    pub fn begin_delete(&mut self) -> Result<PendingWrite, FormOutcome> {
        if self.submitting {
            return Err(FormOutcome::Ignored);
        }
        let FormMode::Edit(current) = &self.mode else {
            return Err(FormOutcome::Stay(Alert::new(
                "Error",
                "Only saved appointments can be deleted.",
            )));
        };

        self.submitting = true;
        Ok(PendingWrite::Delete {
            id: current.id.clone(),
        })
    }

    /// Unlock the form and turn the write result into an outcome. Fields
    /// stay as entered when the write failed.
    pub fn finish_submit(
        &mut self,
        write: &PendingWrite,
        result: AgendaResult<String>,
    ) -> (FormOutcome, Alert) {
        self.submitting = false;
        match result {
            Ok(id) => (
                FormOutcome::NavigateBack { id },
                Alert::success(write.success_message()),
            ),
            Err(e) => {
                let alert = Alert::from_error(&e);
                (FormOutcome::Stay(alert.clone()), alert)
            }
        }
    }

    pub async fn submit(&mut self) -> FormOutcome {
        match self.begin_submit() {
            Ok(write) => self.run(write).await,
            Err(outcome) => outcome,
        }
    }

    pub async fn delete(&mut self) -> FormOutcome {
        match self.begin_delete() {
            Ok(write) => self.run(write).await,
            Err(outcome) => outcome,
        }
    }

    async fn run(&mut self, write: PendingWrite) -> FormOutcome {
        let result = write.execute(&self.gateway).await;
        self.finish_submit(&write, result).0
    }
}
