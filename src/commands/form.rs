use agenda_core::views::{AppointmentForm, FormOutcome};
use anyhow::Result;
use dialoguer::Select;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::utils::tui::{prompt_field, prompt_optional};

/// Field values given on the command line. Anything missing is prompted
/// for when the command runs interactively.
pub struct FieldArgs {
    pub client: Option<String>,
    pub service: Option<String>,
    pub staff: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl FieldArgs {
    fn is_empty(&self) -> bool {
        self.client.is_none()
            && self.service.is_none()
            && self.staff.is_none()
            && self.date.is_none()
            && self.time.is_none()
    }
}

pub async fn create(app: App, args: FieldArgs) -> Result<()> {
    app.require_login()?;

    let interactive = args.client.is_none() || args.service.is_none() || args.time.is_none();
    let mut form = AppointmentForm::create(app.backend.appointments(&app.session));
    fill(&mut form, args, interactive)?;

    match form.submit().await {
        FormOutcome::NavigateBack { id } => {
            if interactive {
                println!();
            }
            println!(
                "{} {}",
                format!("  Booked: {}", form.draft.client_name).green(),
                id.dimmed()
            );
            Ok(())
        }
        FormOutcome::Stay(alert) => anyhow::bail!("{}", alert.message),
        FormOutcome::Ignored => Ok(()),
    }
}

pub async fn edit(app: App, id: &str, args: FieldArgs) -> Result<()> {
    app.require_login()?;

    let gateway = app.backend.appointments(&app.session);
    let Some(appointment) = gateway.get(id).await? else {
        anyhow::bail!("Appointment '{}' not found. See your appointments with: agenda list", id);
    };

    let interactive = args.is_empty();
    let mut form = AppointmentForm::edit(gateway, appointment);
    fill(&mut form, args, interactive)?;

    match form.submit().await {
        FormOutcome::NavigateBack { .. } => {
            if interactive {
                println!();
            }
            println!("{}", format!("  Updated: {}", form.draft.client_name).green());
            Ok(())
        }
        FormOutcome::Stay(alert) => anyhow::bail!("{}", alert.message),
        FormOutcome::Ignored => Ok(()),
    }
}

fn fill(form: &mut AppointmentForm, args: FieldArgs, interactive: bool) -> Result<()> {
    let slots = form.time_slots().to_vec();
    let draft = &mut form.draft;

    // --- Client ---
    if let Some(client) = args.client {
        draft.client_name = client;
    } else if interactive {
        draft.client_name = prompt_field("Client", &draft.client_name)?;
    }

    // --- Service ---
    if let Some(service) = args.service {
        draft.service_name = service;
    } else if interactive {
        draft.service_name = prompt_field("Service", &draft.service_name)?;
    }

    // --- Staff ---
    if let Some(staff) = args.staff {
        draft.staff_name = if staff.is_empty() { None } else { Some(staff) };
    } else if interactive {
        draft.staff_name = prompt_optional("Staff", draft.staff_name.as_deref())?;
    }

    // --- Date ---
    if let Some(date) = args.date {
        draft.date = date;
    } else if interactive {
        draft.date = prompt_field("Date (DD-MM-YYYY)", &draft.date)?;
    }

    // --- Time ---
    if let Some(time) = args.time {
        draft.time = time;
    } else if interactive {
        draft.time = prompt_time(&slots, &draft.time)?;
    }

    Ok(())
}

/// Pick a slot from the configured list, keeping an off-list current value
/// selectable.
fn prompt_time(slots: &[String], current: &str) -> Result<String> {
    if slots.is_empty() {
        return prompt_field("Time", current);
    }

    let mut options = slots.to_vec();
    if !current.is_empty() && !options.iter().any(|s| s == current) {
        options.insert(0, current.to_string());
    }
    let default = options.iter().position(|s| s == current).unwrap_or(0);

    let selection = Select::new()
        .with_prompt("  Time")
        .items(&options)
        .default(default)
        .interact()?;
    Ok(options[selection].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_means_interactive_edit() {
        let args = FieldArgs {
            client: None,
            service: None,
            staff: None,
            date: None,
            time: None,
        };
        assert!(args.is_empty());

        let args = FieldArgs {
            time: Some("15:00".into()),
            ..args
        };
        assert!(!args.is_empty());
    }
}
