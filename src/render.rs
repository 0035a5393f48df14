//! TUI rendering traits for agenda types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to agenda-core types using owo_colors.

use agenda_core::views::Alert;
use agenda_core::{Appointment, User};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Appointment {
    fn render(&self) -> String {
        let when = match (self.date.is_empty(), self.time.is_empty()) {
            (true, _) => self.time.clone(),
            (false, true) => self.date.clone(),
            (false, false) => format!("{} {}", self.date, self.time),
        };
        let staff = self
            .staff_name
            .as_deref()
            .map(|s| format!(" with {s}"))
            .unwrap_or_default();

        format!(
            "{} {}{} {}",
            when.cyan(),
            self.to_string().bold(),
            staff,
            self.id.dimmed()
        )
    }
}

impl Render for User {
    fn render(&self) -> String {
        let mut lines = vec![
            format!("{} {}", "Name: ".dimmed(), self.name),
            format!("{} {}", "Email:".dimmed(), self.email),
        ];
        if let Some(phone) = &self.phone {
            lines.push(format!("{} {}", "Phone:".dimmed(), phone));
        }
        if let Some(city) = &self.city {
            lines.push(format!("{} {}", "City: ".dimmed(), city));
        }
        lines.join("\n")
    }
}

impl Render for Alert {
    fn render(&self) -> String {
        if self.is_success() {
            self.message.green().to_string()
        } else {
            format!("{} {}", format!("{}:", self.title).red().bold(), self.message.red())
        }
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(staff: Option<&str>) -> Appointment {
        Appointment {
            id: "-Nabc".into(),
            client_name: "Rex".into(),
            service_name: "Banho".into(),
            staff_name: staff.map(str::to_string),
            date: "10-01-2025".into(),
            time: "14:00".into(),
            created_at: None,
        }
    }

    #[test]
    fn appointment_shows_when_what_and_id() {
        let line = appointment(None).render();
        assert!(line.contains("10-01-2025 14:00"));
        assert!(line.contains("Rex - Banho"));
        assert!(line.contains("-Nabc"));
        assert!(!line.contains(" with "));
    }

    #[test]
    fn appointment_names_staff_when_present() {
        assert!(appointment(Some("Zé")).render().contains("with Zé"));
    }

    #[test]
    fn pluralize_counts() {
        assert_eq!(pluralize("appointment", 1), "appointment");
        assert_eq!(pluralize("appointment", 3), "appointments");
    }
}
