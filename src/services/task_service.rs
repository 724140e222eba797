//! Task service - task assignment and employee progress updates.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Role, Status, Task, TaskData, TaskRequest, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::services::EmployeeTasks;

#[async_trait]
pub trait TaskService: Send + Sync {
    async fn list_tasks(&self) -> AppResult<Vec<Task>>;

    async fn get_task(&self, id: i64) -> AppResult<Task>;

    /// Assign a new OPEN task dated today
    async fn create_task(&self, request: TaskRequest) -> AppResult<Task>;

    /// Replace a task, keeping its assigned date; status is kept when `None`
    async fn update_task(
        &self,
        id: i64,
        request: TaskRequest,
        status: Option<Status>,
    ) -> AppResult<Task>;

    async fn delete_task(&self, id: i64) -> AppResult<()>;

    /// Non-completed tasks of an employee
    async fn pending_tasks(&self, employee_id: i64) -> AppResult<Vec<Task>>;

    /// Completed tasks of an employee
    async fn archived_tasks(&self, employee_id: i64) -> AppResult<Vec<Task>>;

    /// Change the status of one of the employee's own tasks
    async fn update_status(&self, employee_id: i64, task_id: i64, status: Status)
        -> AppResult<Task>;

    async fn list_non_completed_by_employee(&self, employee: &User) -> AppResult<Vec<Task>>;
}

pub struct TaskManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> TaskManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Resolve the project and employee a request refers to.
    async fn resolve_refs(&self, request: &TaskRequest) -> AppResult<(i64, i64)> {
        let project = self
            .uow
            .projects()
            .find_active_by_code(&request.project_code)
            .await?
            .ok_or_not_found("Project")?;

        let employee = self
            .uow
            .users()
            .find_active_by_username(&request.employee_username)
            .await?
            .ok_or_not_found("Employee")?;

        if employee.role != Role::Employee {
            return Err(AppError::validation(format!(
                "{} is not an Employee",
                employee.username
            )));
        }

        Ok((project.id, employee.id))
    }
}

#[async_trait]
impl<U: UnitOfWork> TaskService for TaskManager<U> {
    async fn list_tasks(&self) -> AppResult<Vec<Task>> {
        self.uow.tasks().list_active().await
    }

    async fn get_task(&self, id: i64) -> AppResult<Task> {
        self.uow
            .tasks()
            .find_active_by_id(id)
            .await?
            .ok_or_not_found("Task")
    }

    async fn create_task(&self, request: TaskRequest) -> AppResult<Task> {
        let (project_id, employee_id) = self.resolve_refs(&request).await?;

        self.uow
            .tasks()
            .create(TaskData {
                project_id,
                employee_id,
                subject: request.subject,
                detail: request.detail,
                assigned_date: chrono::Utc::now().date_naive(),
            })
            .await
    }

    async fn update_task(
        &self,
        id: i64,
        request: TaskRequest,
        status: Option<Status>,
    ) -> AppResult<Task> {
        let mut task = self.get_task(id).await?;
        let (project_id, employee_id) = self.resolve_refs(&request).await?;

        task.project_id = project_id;
        task.employee_id = employee_id;
        task.subject = request.subject;
        task.detail = request.detail;
        if let Some(status) = status {
            task.status = status;
        }
        task.updated_at = chrono::Utc::now();

        self.uow.tasks().save(task).await
    }

    async fn delete_task(&self, id: i64) -> AppResult<()> {
        let mut task = self.get_task(id).await?;
        task.soft_delete();
        self.uow.tasks().save(task).await?;
        Ok(())
    }

    async fn pending_tasks(&self, employee_id: i64) -> AppResult<Vec<Task>> {
        self.uow
            .tasks()
            .list_non_completed_by_employee(employee_id)
            .await
    }

    async fn archived_tasks(&self, employee_id: i64) -> AppResult<Vec<Task>> {
        self.uow.tasks().list_completed_by_employee(employee_id).await
    }

    async fn update_status(
        &self,
        employee_id: i64,
        task_id: i64,
        status: Status,
    ) -> AppResult<Task> {
        let mut task = self.get_task(task_id).await?;

        if !task.is_assigned_to(employee_id) {
            tracing::warn!(employee_id, task_id, "Status change on a task assigned to someone else");
            return Err(AppError::Forbidden);
        }

        task.set_status(status);
        self.uow.tasks().save(task).await
    }

    async fn list_non_completed_by_employee(&self, employee: &User) -> AppResult<Vec<Task>> {
        self.pending_tasks(employee.id).await
    }
}

#[async_trait]
impl<U: UnitOfWork> EmployeeTasks for TaskManager<U> {
    async fn non_completed_for_employee(&self, employee: &User) -> AppResult<Vec<Task>> {
        self.list_non_completed_by_employee(employee).await
    }
}
