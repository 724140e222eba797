//! Task database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Status, Task};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub project_id: i64,
    pub assigned_employee_id: i64,
    pub task_subject: String,
    pub task_detail: String,
    pub task_status: String,
    pub assigned_date: Date,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Task {
    fn from(model: Model) -> Self {
        Task {
            id: model.id,
            project_id: model.project_id,
            employee_id: model.assigned_employee_id,
            subject: model.task_subject,
            detail: model.task_detail,
            status: Status::from(model.task_status.as_str()),
            assigned_date: model.assigned_date,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Task> for ActiveModel {
    fn from(task: Task) -> Self {
        use sea_orm::Set;

        ActiveModel {
            id: Set(task.id),
            project_id: Set(task.project_id),
            assigned_employee_id: Set(task.employee_id),
            task_subject: Set(task.subject),
            task_detail: Set(task.detail),
            task_status: Set(task.status.as_str().to_string()),
            assigned_date: Set(task.assigned_date),
            is_deleted: Set(task.is_deleted),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
        }
    }
}
