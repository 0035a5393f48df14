use agenda_core::views::AppointmentList;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::{Render, pluralize};
use crate::utils::tui::create_spinner;

pub async fn run(app: App) -> Result<()> {
    app.require_login()?;

    let mut list = AppointmentList::new(app.backend.appointments(&app.session));

    let spinner = create_spinner("Loading appointments".to_string());
    let alert = list.on_focus().await;
    spinner.finish_and_clear();

    if let Some(alert) = alert {
        anyhow::bail!("{}", alert.message);
    }

    if list.items().is_empty() {
        println!("{}", "No appointments yet. Book one with: agenda new".dimmed());
        return Ok(());
    }

    for appointment in list.items() {
        println!("{}", appointment.render());
    }

    let count = list.items().len();
    println!("\n{}", format!("{} {}", count, pluralize("appointment", count)).dimmed());
    Ok(())
}
