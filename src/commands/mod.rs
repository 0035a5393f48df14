pub mod auth;
pub mod delete;
pub mod form;
pub mod list;
pub mod migrate;
pub mod profile;
pub mod slots;
pub mod watch;
