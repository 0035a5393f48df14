//! Core types for the agenda ecosystem.
//!
//! This crate provides everything shared by the `agenda` CLI and
//! `agenda-server`:
//! - `store`: the hierarchical record store (in memory or one JSON file)
//! - `rules`: per-user access rules and the `GuardedStore` that applies them
//! - `gateway` and `profile`: per-user appointment and profile operations
//! - `auth` and `session`: accounts, sign-in and the current identity
//! - `views`: headless list and form controllers

pub mod appointment;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod gateway;
pub mod lock;
pub mod profile;
pub mod push_id;
mod record;
pub mod rules;
pub mod session;
pub mod store;
pub mod user;
pub mod views;

pub use appointment::{Appointment, AppointmentDraft, AppointmentPatch};
pub use auth::AuthService;
pub use backend::Backend;
pub use config::{AgendaConfig, BookingConfig};
pub use error::{AgendaError, AgendaResult, FieldError};
pub use gateway::{AppointmentGateway, LiveAppointments};
pub use profile::ProfileGateway;
pub use session::{Identity, Session};
pub use user::{NewUser, User, UserPatch};
