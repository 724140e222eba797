//! Fixtures shared by the service unit tests.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::domain::{Gender, Project, Role, Status, Task, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{
    MockProjectRepository, MockTaskRepository, MockUserRepository, ProjectRepository,
    TaskRepository, TransactionContext, UnitOfWork, UserRepository,
};

pub fn user(id: i64, username: &str, role: Role) -> User {
    User {
        id,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        username: username.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$stored".to_string(),
        phone: "5551234567".to_string(),
        enabled: true,
        is_deleted: false,
        role,
        gender: Gender::Male,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn project(id: i64, code: &str, manager_id: i64) -> Project {
    Project {
        id,
        code: code.to_string(),
        name: format!("{} name", code),
        manager_id,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        detail: "detail".to_string(),
        status: Status::Open,
        is_deleted: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn task(id: i64, project_id: i64, employee_id: i64) -> Task {
    Task {
        id,
        project_id,
        employee_id,
        subject: format!("Task {}", id),
        detail: "detail".to_string(),
        status: Status::Open,
        assigned_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        is_deleted: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Unit of Work over mock repositories. Transactions are unavailable.
pub struct MockUow {
    users: Arc<MockUserRepository>,
    projects: Arc<MockProjectRepository>,
    tasks: Arc<MockTaskRepository>,
}

impl MockUow {
    pub fn new(
        users: MockUserRepository,
        projects: MockProjectRepository,
        tasks: MockTaskRepository,
    ) -> Arc<Self> {
        Arc::new(Self {
            users: Arc::new(users),
            projects: Arc::new(projects),
            tasks: Arc::new(tasks),
        })
    }

    pub fn with_users(users: MockUserRepository) -> Arc<Self> {
        Self::new(users, MockProjectRepository::new(), MockTaskRepository::new())
    }
}

#[async_trait]
impl UnitOfWork for MockUow {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn projects(&self) -> Arc<dyn ProjectRepository> {
        self.projects.clone()
    }

    fn tasks(&self) -> Arc<dyn TaskRepository> {
        self.tasks.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        Err(AppError::internal("transactions are not available in unit tests"))
    }
}
