use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;

pub fn run(app: App) -> Result<()> {
    let booking = app.backend.booking();

    for slot in &booking.time_slots {
        println!("{}", slot);
    }

    if booking.enforce_time_slots {
        println!("\n{}", "Only these times can be booked".dimmed());
    }
    Ok(())
}
