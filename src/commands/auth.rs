use agenda_core::NewUser;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::utils::tui::{create_spinner, prompt_optional, prompt_password, prompt_text};

pub async fn register(app: App) -> Result<()> {
    println!("Create your agenda account\n");

    let new_user = NewUser {
        name: prompt_text("Name")?,
        email: prompt_text("Email")?,
        phone: prompt_optional("Phone", None)?,
        city: prompt_optional("City", None)?,
    };
    let password = prompt_password("Password")?;
    let confirm = prompt_password("Confirm password")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let spinner = create_spinner("Creating account".to_string());
    let result = app.backend.auth(&app.session).register(new_user, &password).await;
    spinner.finish_and_clear();

    let user = result?;
    app.save_session()?;

    println!("{}", format!("Welcome, {}!", user.name).green());
    Ok(())
}

pub async fn login(app: App, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_text("Email")?,
    };
    let password = prompt_password("Password")?;

    let spinner = create_spinner("Signing in".to_string());
    let result = app.backend.auth(&app.session).sign_in(&email, &password).await;
    spinner.finish_and_clear();

    let identity = result?;
    app.save_session()?;

    println!("{}", format!("Signed in as {}", identity.email).green());
    Ok(())
}

pub fn logout(app: App) -> Result<()> {
    if !app.session.is_authenticated() {
        println!("{}", "Not signed in".dimmed());
        return Ok(());
    }

    app.backend.auth(&app.session).sign_out();
    app.save_session()?;

    println!("Signed out");
    Ok(())
}

pub fn whoami(app: App) -> Result<()> {
    match app.session.current() {
        Some(identity) => println!("{} {}", identity.email, identity.uid.dimmed()),
        None => println!("{}", "Not signed in".dimmed()),
    }
    Ok(())
}
