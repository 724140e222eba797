//! Service Container - centralized service access.
//!
//! Wires every service to one shared Unit of Work and picks the identity
//! provider implementation from configuration.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, DeletionPolicy, DisabledIdentityProvider, IdentityProvider,
    ProjectManager, ProjectService, TaskManager, TaskService, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{KeycloakClient, Persistence};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn projects(&self) -> Arc<dyn ProjectService>;

    fn tasks(&self) -> Arc<dyn TaskService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    project_service: Arc<dyn ProjectService>,
    task_service: Arc<dyn TaskService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        project_service: Arc<dyn ProjectService>,
        task_service: Arc<dyn TaskService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            project_service,
            task_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> AppResult<Self> {
        let identity: Arc<dyn IdentityProvider> = match config.keycloak.clone() {
            Some(keycloak) => {
                tracing::info!(url = %keycloak.base_url, realm = %keycloak.realm, "Keycloak identity provider enabled");
                Arc::new(KeycloakClient::new(keycloak)?)
            }
            None => Arc::new(DisabledIdentityProvider),
        };

        let uow = Arc::new(Persistence::new(db));
        let policy = DeletionPolicy::from_uow(uow.clone());

        Ok(Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone(), policy, identity)),
            project_service: Arc::new(ProjectManager::new(uow.clone())),
            task_service: Arc::new(TaskManager::new(uow)),
        })
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn projects(&self) -> Arc<dyn ProjectService> {
        self.project_service.clone()
    }

    fn tasks(&self) -> Arc<dyn TaskService> {
        self.task_service.clone()
    }
}
