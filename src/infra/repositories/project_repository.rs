//! Project repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::project::{self, ActiveModel, Entity as ProjectEntity};
use crate::domain::{Project, ProjectData, Status};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Project repository trait. Queries only see active projects.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<Project>>;

    async fn list_active(&self) -> AppResult<Vec<Project>>;

    async fn list_by_manager(&self, manager_id: i64) -> AppResult<Vec<Project>>;

    /// Projects of a manager whose status is not COMPLETE
    async fn list_non_completed_by_manager(&self, manager_id: i64) -> AppResult<Vec<Project>>;

    /// Insert a new project with status OPEN
    async fn create(&self, data: ProjectData) -> AppResult<Project>;

    async fn save(&self, project: Project) -> AppResult<Project>;
}

/// Concrete implementation of ProjectRepository
pub struct ProjectStore {
    db: DatabaseConnection,
}

impl ProjectStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProjectRepository for ProjectStore {
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<Project>> {
        let result = ProjectEntity::find()
            .filter(project::Column::ProjectCode.eq(code))
            .filter(project::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;

        Ok(result.map(Project::from))
    }

    async fn list_active(&self) -> AppResult<Vec<Project>> {
        let models = ProjectEntity::find()
            .filter(project::Column::IsDeleted.eq(false))
            .order_by_asc(project::Column::ProjectCode)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Project::from).collect())
    }

    async fn list_by_manager(&self, manager_id: i64) -> AppResult<Vec<Project>> {
        let models = ProjectEntity::find()
            .filter(project::Column::ManagerId.eq(manager_id))
            .filter(project::Column::IsDeleted.eq(false))
            .order_by_asc(project::Column::ProjectCode)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Project::from).collect())
    }

    async fn list_non_completed_by_manager(&self, manager_id: i64) -> AppResult<Vec<Project>> {
        let models = ProjectEntity::find()
            .filter(project::Column::ManagerId.eq(manager_id))
            .filter(project::Column::ProjectStatus.ne(Status::Complete.as_str()))
            .filter(project::Column::IsDeleted.eq(false))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Project::from).collect())
    }

    async fn create(&self, data: ProjectData) -> AppResult<Project> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            project_code: Set(data.code),
            project_name: Set(data.name),
            manager_id: Set(data.manager_id),
            start_date: Set(data.start_date),
            end_date: Set(data.end_date),
            project_detail: Set(data.detail),
            project_status: Set(Status::Open.as_str().to_string()),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Project::from(model))
    }

    async fn save(&self, project: Project) -> AppResult<Project> {
        let model = ActiveModel::from(project).update(&self.db).await?;
        Ok(Project::from(model))
    }
}
