use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::pluralize;

pub async fn run(app: App) -> Result<()> {
    app.require_login()?;

    let migrated = app
        .backend
        .appointments(&app.session)
        .migrate_legacy()
        .await?;

    if migrated == 0 {
        println!("{}", "All appointments already use the current format".dimmed());
    } else {
        println!(
            "{}",
            format!("Migrated {} {}", migrated, pluralize("appointment", migrated)).green()
        );
    }
    Ok(())
}
