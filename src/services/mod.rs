//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.

mod auth_service;
pub mod container;
pub mod eligibility;
pub mod identity;
mod project_service;
mod task_service;
mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{issue_token, verify_token, AuthService, Authenticator, Claims, TokenResponse};
pub use eligibility::{
    BlockReason, DeletionPolicy, Eligibility, EmployeeTasks, ManagerProjects, RoleDirectory,
};
pub use identity::{DisabledIdentityProvider, IdentityProvider};
pub use project_service::{ProjectManager, ProjectService};
pub use task_service::{TaskManager, TaskService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use eligibility::{MockEmployeeTasks, MockManagerProjects, MockRoleDirectory};
#[cfg(any(test, feature = "test-utils"))]
pub use identity::MockIdentityProvider;
