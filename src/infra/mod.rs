//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Unit of Work for transaction management
//! - Keycloak admin client for the identity provider

pub mod db;
pub mod keycloak;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use keycloak::KeycloakClient;
pub use repositories::{
    ProjectRepository, ProjectStore, TaskRepository, TaskStore, UserRepository, UserStore,
};
pub use unit_of_work::{
    Persistence, TransactionContext, TxProjectRepository, TxTaskRepository, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockProjectRepository, MockTaskRepository, MockUserRepository};
