//! Ticketing API - users, projects and tasks behind role based access.
//!
//! # Layers
//!
//! - **cli** / **commands**: `serve` and `migrate` entry points
//! - **config**: environment configuration and constants
//! - **domain**: users, projects, tasks, roles and passwords
//! - **services**: use cases, including the user deletion policy
//! - **infra**: database, repositories, Unit of Work, Keycloak client
//! - **api**: handlers, middleware, routes and OpenAPI document
//! - **types**: the response envelope
//! - **errors**: centralized error handling
//!
//! ```bash
//! cargo run -- migrate up
//! cargo run -- serve --port 3000
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use domain::{Password, Project, Role, Status, Task, User};
pub use errors::{AppError, AppResult};
