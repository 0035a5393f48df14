use std::io::{self, Write};

use anyhow::{Context, Result};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["-", "\\", "|", "/"])
            .template("{msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Prompt the user for text input.
pub fn prompt_text(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_string())
}

/// Prompt the user for password input (hidden).
pub fn prompt_password(label: &str) -> Result<String> {
    let prompt = format!("{}: ", label);
    rpassword::prompt_password(&prompt).context("Failed to read password")
}

/// Prompt with `current` prefilled; an empty answer keeps it.
pub fn prompt_field(label: &str, current: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(format!("  {label}"))
        .default(current.to_string())
        .show_default(!current.is_empty())
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

/// Prompt for a value that may be left blank.
pub fn prompt_optional(label: &str, current: Option<&str>) -> Result<Option<String>> {
    let value = prompt_field(&format!("{label} (skip)"), current.unwrap_or_default())?;
    Ok(if value.is_empty() { None } else { Some(value) })
}
