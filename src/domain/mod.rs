//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod password;
pub mod project;
pub mod role;
pub mod task;
pub mod user;

pub use password::Password;
pub use project::{Project, ProjectData, ProjectDetails, ProjectRequest, ProjectResponse, Status};
pub use role::Role;
pub use task::{Task, TaskData, TaskRequest, TaskResponse};
pub use user::{validate_phone, Gender, NewUser, User, UserChanges, UserResponse};
