//! Task repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::entities::task::{self, ActiveModel, Entity as TaskEntity};
use crate::domain::{Status, Task, TaskData};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Task repository trait. Queries only see active tasks.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find_active_by_id(&self, id: i64) -> AppResult<Option<Task>>;

    async fn list_active(&self) -> AppResult<Vec<Task>>;

    /// Tasks assigned to an employee whose status is not COMPLETE
    async fn list_non_completed_by_employee(&self, employee_id: i64) -> AppResult<Vec<Task>>;

    async fn list_completed_by_employee(&self, employee_id: i64) -> AppResult<Vec<Task>>;

    /// `(completed, unfinished)` task counts of a project
    async fn count_by_project(&self, project_id: i64) -> AppResult<(u64, u64)>;

    /// Insert a new task with status OPEN
    async fn create(&self, data: TaskData) -> AppResult<Task>;

    async fn save(&self, task: Task) -> AppResult<Task>;
}

/// Concrete implementation of TaskRepository
pub struct TaskStore {
    db: DatabaseConnection,
}

impl TaskStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn list_by_employee_and_status(
        &self,
        employee_id: i64,
        completed: bool,
    ) -> AppResult<Vec<Task>> {
        let status = task::Column::TaskStatus;
        let by_status = if completed {
            status.eq(Status::Complete.as_str())
        } else {
            status.ne(Status::Complete.as_str())
        };

        let models = TaskEntity::find()
            .filter(task::Column::AssignedEmployeeId.eq(employee_id))
            .filter(by_status)
            .filter(task::Column::IsDeleted.eq(false))
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Task::from).collect())
    }
}

#[async_trait]
impl TaskRepository for TaskStore {
    async fn find_active_by_id(&self, id: i64) -> AppResult<Option<Task>> {
        let result = TaskEntity::find_by_id(id)
            .filter(task::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;

        Ok(result.map(Task::from))
    }

    async fn list_active(&self) -> AppResult<Vec<Task>> {
        let models = TaskEntity::find()
            .filter(task::Column::IsDeleted.eq(false))
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Task::from).collect())
    }

    async fn list_non_completed_by_employee(&self, employee_id: i64) -> AppResult<Vec<Task>> {
        self.list_by_employee_and_status(employee_id, false).await
    }

    async fn list_completed_by_employee(&self, employee_id: i64) -> AppResult<Vec<Task>> {
        self.list_by_employee_and_status(employee_id, true).await
    }

    async fn count_by_project(&self, project_id: i64) -> AppResult<(u64, u64)> {
        let completed = TaskEntity::find()
            .filter(task::Column::ProjectId.eq(project_id))
            .filter(task::Column::TaskStatus.eq(Status::Complete.as_str()))
            .filter(task::Column::IsDeleted.eq(false))
            .count(&self.db)
            .await?;

        let unfinished = TaskEntity::find()
            .filter(task::Column::ProjectId.eq(project_id))
            .filter(task::Column::TaskStatus.ne(Status::Complete.as_str()))
            .filter(task::Column::IsDeleted.eq(false))
            .count(&self.db)
            .await?;

        Ok((completed, unfinished))
    }

    async fn create(&self, data: TaskData) -> AppResult<Task> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            project_id: Set(data.project_id),
            assigned_employee_id: Set(data.employee_id),
            task_subject: Set(data.subject),
            task_detail: Set(data.detail),
            task_status: Set(Status::Open.as_str().to_string()),
            assigned_date: Set(data.assigned_date),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Task::from(model))
    }

    async fn save(&self, task: Task) -> AppResult<Task> {
        let model = ActiveModel::from(task).update(&self.db).await?;
        Ok(Task::from(model))
    }
}
