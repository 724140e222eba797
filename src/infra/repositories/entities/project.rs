//! Project database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Project, Status};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub project_code: String,
    pub project_name: String,
    pub manager_id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub project_detail: String,
    pub project_status: String,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Project {
    fn from(model: Model) -> Self {
        Project {
            id: model.id,
            code: model.project_code,
            name: model.project_name,
            manager_id: model.manager_id,
            start_date: model.start_date,
            end_date: model.end_date,
            detail: model.project_detail,
            status: Status::from(model.project_status.as_str()),
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Project> for ActiveModel {
    fn from(project: Project) -> Self {
        use sea_orm::Set;

        ActiveModel {
            id: Set(project.id),
            project_code: Set(project.code),
            project_name: Set(project.name),
            manager_id: Set(project.manager_id),
            start_date: Set(project.start_date),
            end_date: Set(project.end_date),
            project_detail: Set(project.detail),
            project_status: Set(project.status.as_str().to_string()),
            is_deleted: Set(project.is_deleted),
            created_at: Set(project.created_at),
            updated_at: Set(project.updated_at),
        }
    }
}
