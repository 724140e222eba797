//! Project service - project lifecycle and progress reporting.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;

use crate::domain::{Project, ProjectData, ProjectDetails, ProjectRequest, Role, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::services::ManagerProjects;
use crate::with_transaction;

#[async_trait]
pub trait ProjectService: Send + Sync {
    /// Projects with task counts. `None` lists every active project.
    async fn list_project_details(&self, manager_id: Option<i64>) -> AppResult<Vec<ProjectDetails>>;

    async fn get_by_code(&self, code: &str) -> AppResult<Project>;

    async fn create_project(&self, request: ProjectRequest) -> AppResult<Project>;

    async fn update_project(&self, request: ProjectRequest) -> AppResult<Project>;

    /// Soft delete the project together with its tasks
    async fn delete_project(&self, code: &str) -> AppResult<()>;

    /// Mark the project and all of its tasks COMPLETE
    async fn complete_project(&self, code: &str) -> AppResult<()>;

    /// Projects of `manager` that are not COMPLETE. Backs the deletion policy.
    async fn list_non_completed_by_manager(&self, manager: &User) -> AppResult<Vec<Project>>;
}

pub struct ProjectManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ProjectManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Resolve the assigned manager and check its role.
    async fn resolve_manager(&self, username: &str) -> AppResult<User> {
        let manager = self
            .uow
            .users()
            .find_active_by_username(username)
            .await?
            .ok_or_not_found("Manager")?;

        if manager.role != Role::Manager {
            return Err(AppError::validation(format!(
                "{} is not a Manager",
                manager.username
            )));
        }

        Ok(manager)
    }
}

fn check_dates(request: &ProjectRequest) -> AppResult<()> {
    if request.end_date < request.start_date {
        return Err(AppError::validation("End date must not precede start date"));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> ProjectService for ProjectManager<U> {
    async fn list_project_details(&self, manager_id: Option<i64>) -> AppResult<Vec<ProjectDetails>> {
        let projects = match manager_id {
            Some(id) => self.uow.projects().list_by_manager(id).await?,
            None => self.uow.projects().list_active().await?,
        };

        let tasks = self.uow.tasks();
        try_join_all(projects.into_iter().map(|project| {
            let tasks = tasks.clone();
            async move {
                let (completed, unfinished) = tasks.count_by_project(project.id).await?;
                Ok::<_, AppError>(ProjectDetails {
                    project: project.into(),
                    completed_task_count: completed,
                    unfinished_task_count: unfinished,
                })
            }
        }))
        .await
    }

    async fn get_by_code(&self, code: &str) -> AppResult<Project> {
        self.uow
            .projects()
            .find_active_by_code(code)
            .await?
            .ok_or_not_found("Project")
    }

    async fn create_project(&self, request: ProjectRequest) -> AppResult<Project> {
        check_dates(&request)?;

        let projects = self.uow.projects();
        if projects.find_active_by_code(&request.code).await?.is_some() {
            return Err(AppError::conflict("Project"));
        }

        let manager = self.resolve_manager(&request.manager_username).await?;
        let project = projects
            .create(ProjectData {
                code: request.code,
                name: request.name,
                manager_id: manager.id,
                start_date: request.start_date,
                end_date: request.end_date,
                detail: request.detail,
            })
            .await?;

        tracing::info!(code = %project.code, manager = %manager.username, "Project created");
        Ok(project)
    }

    async fn update_project(&self, request: ProjectRequest) -> AppResult<Project> {
        check_dates(&request)?;

        let mut project = self.get_by_code(&request.code).await?;
        let manager = self.resolve_manager(&request.manager_username).await?;

        project.name = request.name;
        project.manager_id = manager.id;
        project.start_date = request.start_date;
        project.end_date = request.end_date;
        project.detail = request.detail;
        project.updated_at = chrono::Utc::now();

        self.uow.projects().save(project).await
    }

    async fn delete_project(&self, code: &str) -> AppResult<()> {
        let code = code.to_string();
        let removed = with_transaction!(self.uow, |ctx| {
            let mut project = ctx
                .projects()
                .find_active_by_code(&code)
                .await?
                .ok_or_not_found("Project")?;
            let project_id = project.id;
            project.soft_delete();
            ctx.projects().save(project).await?;
            ctx.tasks().delete_by_project(project_id).await
        })?;

        tracing::info!(tasks = removed, "Project deleted");
        Ok(())
    }

    async fn complete_project(&self, code: &str) -> AppResult<()> {
        let code = code.to_string();
        let completed = with_transaction!(self.uow, |ctx| {
            let mut project = ctx
                .projects()
                .find_active_by_code(&code)
                .await?
                .ok_or_not_found("Project")?;
            let project_id = project.id;
            project.complete();
            ctx.projects().save(project).await?;
            ctx.tasks().complete_by_project(project_id).await
        })?;

        tracing::info!(tasks = completed, "Project completed");
        Ok(())
    }

    async fn list_non_completed_by_manager(&self, manager: &User) -> AppResult<Vec<Project>> {
        self.uow
            .projects()
            .list_non_completed_by_manager(manager.id)
            .await
    }
}

#[async_trait]
impl<U: UnitOfWork> ManagerProjects for ProjectManager<U> {
    async fn non_completed_for_manager(&self, manager: &User) -> AppResult<Vec<Project>> {
        self.list_non_completed_by_manager(manager).await
    }
}
