use std::sync::Arc;
use std::time::Duration;

use agenda_core::store::FileStore;
use agenda_core::views::AppointmentList;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::Render;

/// How often the store file is checked for writes by other processes.
const RELOAD_INTERVAL: Duration = Duration::from_secs(1);

pub async fn run(app: App) -> Result<()> {
    app.require_login()?;

    let gateway = app.backend.appointments(&app.session);
    let mut live = gateway.subscribe()?;
    let mut list = AppointmentList::new(gateway);

    let reloader = tokio::spawn(reload_loop(app.store.clone()));

    println!("{}", "Watching appointments (Ctrl-C to stop)".dimmed());

    loop {
        tokio::select! {
            snapshot = live.next() => match snapshot {
                Some(Ok(items)) => {
                    list.apply_snapshot(items);
                    print_snapshot(&list);
                }
                Some(Err(e)) => eprintln!("{}", e.to_string().red()),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    reloader.abort();
    live.unsubscribe();
    Ok(())
}

async fn reload_loop(store: Arc<FileStore>) {
    let mut interval = tokio::time::interval(RELOAD_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(e) = store.reload_if_changed().await {
            tracing::warn!(error = %e, "failed to reload store");
        }
    }
}

fn print_snapshot(list: &AppointmentList) {
    let now = chrono::Local::now().format("%H:%M:%S");
    println!("\n{}", format!("── {} ──", now).dimmed());

    if list.items().is_empty() {
        println!("{}", "No appointments".dimmed());
    }
    for appointment in list.items() {
        println!("{}", appointment.render());
    }
}
