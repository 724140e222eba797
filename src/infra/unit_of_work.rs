//! Unit of Work pattern implementation.
//!
//! Centralizes access to the user, project and task repositories and runs
//! multi-row operations inside a single database transaction.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, QueryFilter, TransactionTrait,
};
use std::sync::Arc;

use super::repositories::entities::{project, task};
use super::repositories::{
    ProjectRepository, ProjectStore, TaskRepository, TaskStore, UserRepository, UserStore,
};
use crate::domain::{Project, Status};
use crate::errors::AppResult;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic transaction methods.
/// Services are generic over it; tests supply hand-written fakes.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get project repository
    fn projects(&self) -> Arc<dyn ProjectRepository>;

    /// Get task repository
    fn tasks(&self) -> Arc<dyn TaskRepository>;

    /// Execute a closure within a ReadCommitted transaction.
    ///
    /// Committed when the closure returns `Ok`, rolled back otherwise.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Get project repository for this transaction
    pub fn projects(&self) -> TxProjectRepository<'_> {
        TxProjectRepository { txn: self.txn }
    }

    /// Get task repository for this transaction
    pub fn tasks(&self) -> TxTaskRepository<'_> {
        TxTaskRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    project_repo: Arc<ProjectStore>,
    task_repo: Arc<TaskStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            project_repo: Arc::new(ProjectStore::new(db.clone())),
            task_repo: Arc::new(TaskStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn projects(&self) -> Arc<dyn ProjectRepository> {
        self.project_repo.clone()
    }

    fn tasks(&self) -> Arc<dyn TaskRepository> {
        self.task_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await?;

        match f(TransactionContext::new(&txn)).await {
            Ok(result) => {
                txn.commit().await?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware project repository.
pub struct TxProjectRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxProjectRepository<'a> {
    /// Find active project by code
    pub async fn find_active_by_code(&self, code: &str) -> AppResult<Option<Project>> {
        let result = project::Entity::find()
            .filter(project::Column::ProjectCode.eq(code))
            .filter(project::Column::IsDeleted.eq(false))
            .one(self.txn)
            .await?;

        Ok(result.map(Project::from))
    }

    /// Persist every column of an existing project
    pub async fn save(&self, project: Project) -> AppResult<Project> {
        let model = project::ActiveModel::from(project).update(self.txn).await?;
        Ok(Project::from(model))
    }
}

/// Transaction-aware task repository for project-wide updates.
pub struct TxTaskRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxTaskRepository<'a> {
    /// Mark every active task of a project COMPLETE. Returns affected rows.
    pub async fn complete_by_project(&self, project_id: i64) -> AppResult<u64> {
        let result = task::Entity::update_many()
            .col_expr(task::Column::TaskStatus, Expr::value(Status::Complete.as_str()))
            .col_expr(task::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(task::Column::ProjectId.eq(project_id))
            .filter(task::Column::IsDeleted.eq(false))
            .exec(self.txn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Soft delete every active task of a project. Returns affected rows.
    pub async fn delete_by_project(&self, project_id: i64) -> AppResult<u64> {
        let result = task::Entity::update_many()
            .col_expr(task::Column::IsDeleted, Expr::value(true))
            .col_expr(task::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(task::Column::ProjectId.eq(project_id))
            .filter(task::Column::IsDeleted.eq(false))
            .exec(self.txn)
            .await?;

        Ok(result.rows_affected)
    }
}

/// Run a block inside `UnitOfWork::transaction`.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
