#![doc = "The `timetrack` library crate."]
#![doc = ""]
#![doc = "Token issuance and verification, owner-scoped task storage and filtering,"]
#![doc = "routing configuration, and error handling for the time-tracking service."]
#![doc = "The binary (`main.rs`) wires these into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
pub use crate::repository::TaskRepository;
