//! API middleware.

mod auth;
mod request_log;

pub use auth::{auth_middleware, require_any_role, CurrentUser};
pub use request_log::request_log_middleware;
