#![doc = "The `tasktracker` library crate."]
#![doc = ""]
#![doc = "Per-user task tracking behind a single authentication pipeline (credential"]
#![doc = "extraction, token verification, identity resolution), composable role and"]
#![doc = "verification guards, and an ownership-scoped task service. The binary in"]
#![doc = "`main.rs` wires these into an actix-web server backed by Postgres."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
