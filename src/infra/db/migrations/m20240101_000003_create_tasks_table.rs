//! Migration: Create tasks table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000002_create_projects_table::Projects;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::ProjectId).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::AssignedEmployeeId).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::TaskSubject).string().not_null())
                    .col(ColumnDef::new(Tasks::TaskDetail).text().not_null())
                    .col(ColumnDef::new(Tasks::TaskStatus).string_len(20).not_null())
                    .col(ColumnDef::new(Tasks::AssignedDate).date().not_null())
                    .col(ColumnDef::new(Tasks::IsDeleted).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Tasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_project")
                            .from(Tasks::Table, Tasks::ProjectId)
                            .to(Projects::Table, Projects::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_employee")
                            .from(Tasks::Table, Tasks::AssignedEmployeeId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_employee_status")
                    .table(Tasks::Table)
                    .col(Tasks::AssignedEmployeeId)
                    .col(Tasks::TaskStatus)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    ProjectId,
    AssignedEmployeeId,
    TaskSubject,
    TaskDetail,
    TaskStatus,
    AssignedDate,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}
