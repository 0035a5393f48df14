mod app;
mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::{Access, App};

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Book and manage appointments in your agenda")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register,
    /// Sign in to an existing account
    Login {
        email: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Whoami,
    /// List your appointments
    List,
    /// Book a new appointment
    New {
        /// Client (or pet) name
        #[arg(long)]
        client: Option<String>,

        /// Service to book (e.g. "Haircut", "Banho")
        #[arg(long)]
        service: Option<String>,

        /// Staff member (barber, groomer)
        #[arg(long)]
        staff: Option<String>,

        /// Date, e.g. 2025-01-10 or 10/01/2025
        #[arg(short, long)]
        date: Option<String>,

        /// Time slot, e.g. 14:00
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Change an existing appointment
    Edit {
        id: String,

        #[arg(long)]
        client: Option<String>,

        #[arg(long)]
        service: Option<String>,

        #[arg(long)]
        staff: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        time: Option<String>,
    },
    /// Delete an appointment
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Follow your appointments as they change
    Watch,
    /// Show or change your profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// Rewrite appointments saved with old field names
    Migrate,
    /// List the bookable time slots
    Slots,
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Edit {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        city: Option<String>,
    },
    /// Delete your account, profile and appointments
    Delete {
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("AGENDA_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Register => commands::auth::register(App::open(Access::Write).await?).await,
        Commands::Login { email } => {
            commands::auth::login(App::open(Access::Write).await?, email).await
        }
        Commands::Logout => commands::auth::logout(App::open(Access::Read).await?),
        Commands::Whoami => commands::auth::whoami(App::open(Access::Read).await?),
        Commands::List => commands::list::run(App::open(Access::Read).await?).await,
        Commands::New {
            client,
            service,
            staff,
            date,
            time,
        } => {
            let fields = commands::form::FieldArgs {
                client,
                service,
                staff,
                date,
                time,
            };
            commands::form::create(App::open(Access::Write).await?, fields).await
        }
        Commands::Edit {
            id,
            client,
            service,
            staff,
            date,
            time,
        } => {
            let fields = commands::form::FieldArgs {
                client,
                service,
                staff,
                date,
                time,
            };
            commands::form::edit(App::open(Access::Write).await?, &id, fields).await
        }
        Commands::Delete { id, force } => {
            commands::delete::run(App::open(Access::Write).await?, &id, force).await
        }
        Commands::Watch => commands::watch::run(App::open(Access::Read).await?).await,
        Commands::Profile { action } => {
            let app = match action {
                None | Some(ProfileAction::Show) => App::open(Access::Read).await?,
                Some(_) => App::open(Access::Write).await?,
            };
            match action {
                None | Some(ProfileAction::Show) => commands::profile::show(app).await,
                Some(ProfileAction::Edit { name, phone, city }) => {
                    commands::profile::edit(app, name, phone, city).await
                }
                Some(ProfileAction::Delete { force }) => {
                    commands::profile::delete(app, force).await
                }
            }
        }
        Commands::Migrate => commands::migrate::run(App::open(Access::Write).await?).await,
        Commands::Slots => commands::slots::run(App::open(Access::Read).await?),
    }
}
