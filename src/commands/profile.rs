use agenda_core::UserPatch;
use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::Render;
use crate::utils::tui::{prompt_field, prompt_optional};

pub async fn show(app: App) -> Result<()> {
    app.require_login()?;

    match app.backend.profiles(&app.session).current().await? {
        Some(user) => println!("{}", user.render()),
        None => println!("{}", "No profile saved for this account".dimmed()),
    }
    Ok(())
}

pub async fn edit(
    app: App,
    name: Option<String>,
    phone: Option<String>,
    city: Option<String>,
) -> Result<()> {
    app.require_login()?;

    let profiles = app.backend.profiles(&app.session);
    let interactive = name.is_none() && phone.is_none() && city.is_none();

    let patch = if interactive {
        let Some(current) = profiles.current().await? else {
            anyhow::bail!("No profile saved for this account");
        };
        UserPatch {
            name: Some(prompt_field("Name", &current.name)?),
            phone: prompt_optional("Phone", current.phone.as_deref())?,
            city: prompt_optional("City", current.city.as_deref())?,
        }
    } else {
        UserPatch { name, phone, city }
    };

    let user = profiles.update(&patch).await?;

    if interactive {
        println!();
    }
    println!("{}", user.render());
    Ok(())
}

pub async fn delete(app: App, force: bool) -> Result<()> {
    let identity = app.require_login()?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete the account {} and all of its appointments?",
                identity.email
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    app.backend.auth(&app.session).delete_account().await?;
    app.save_session()?;

    println!("Account deleted");
    Ok(())
}
