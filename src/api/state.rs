//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::{
    AuthService, ProjectService, ServiceContainer, Services, TaskService, UserService,
};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub project_service: Arc<dyn ProjectService>,
    pub task_service: Arc<dyn TaskService>,
    /// Database handle, used by the health check
    pub database: Arc<Database>,
}

impl AppState {
    /// Build the state from a database connection and config.
    pub fn from_config(database: Arc<Database>, config: Config) -> AppResult<Self> {
        let container = Services::from_connection(database.get_connection(), config)?;
        Ok(Self::from_container(&container, database))
    }

    /// Build the state from any service container.
    pub fn from_container(container: &dyn ServiceContainer, database: Arc<Database>) -> Self {
        Self::new(
            container.auth(),
            container.users(),
            container.projects(),
            container.tasks(),
            database,
        )
    }

    /// Create application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        project_service: Arc<dyn ProjectService>,
        task_service: Arc<dyn TaskService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            project_service,
            task_service,
            database,
        }
    }
}
