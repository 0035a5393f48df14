use agenda_core::views::AppointmentList;
use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::Render;

pub async fn run(app: App, id: &str, force: bool) -> Result<()> {
    app.require_login()?;

    let mut list = AppointmentList::new(app.backend.appointments(&app.session));
    if let Some(alert) = list.on_focus().await {
        anyhow::bail!("{}", alert.message);
    }

    let prompt = list.request_delete(id).clone();

    if !force {
        if let Some(appointment) = list.items().iter().find(|a| a.id == id) {
            println!("{}\n", appointment.render());
        } else {
            println!("{}\n", format!("No appointment with id {id} is listed.").dimmed());
        }

        let confirmed = Confirm::new()
            .with_prompt(prompt.message)
            .default(false)
            .interact()?;

        if !confirmed {
            list.cancel_delete();
            return Ok(());
        }
    }

    match list.confirm_delete().await {
        Some(alert) if alert.is_success() => {
            println!("{}", alert.render());
            Ok(())
        }
        Some(alert) => anyhow::bail!("{}", alert.message),
        None => Ok(()),
    }
}
