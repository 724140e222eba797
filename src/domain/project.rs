//! Project and task status, and the project entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::DELETED_KEY_SEPARATOR;

/// Progress status shared by projects and tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Open,
    InProgress,
    UatTest,
    Complete,
}

impl Status {
    /// Code persisted in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::InProgress => "IN_PROGRESS",
            Status::UatTest => "UAT_TEST",
            Status::Complete => "COMPLETE",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Status::Complete)
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        match s {
            "IN_PROGRESS" => Status::InProgress,
            "UAT_TEST" => Status::UatTest,
            "COMPLETE" => Status::Complete,
            _ => Status::Open,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub manager_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub detail: String,
    pub status: Status,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Soft delete the project, freeing its code for reuse.
    pub fn soft_delete(&mut self) {
        self.code = format!("{}{}{}", self.code, DELETED_KEY_SEPARATOR, self.id);
        self.is_deleted = true;
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self) {
        self.status = Status::Complete;
        self.updated_at = Utc::now();
    }
}

/// Column values for a project row about to be inserted or replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectData {
    pub code: String,
    pub name: String,
    pub manager_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub detail: String,
}

/// Project as requested by a client; the manager is referenced by username.
#[derive(Debug, Clone)]
pub struct ProjectRequest {
    pub code: String,
    pub name: String,
    pub manager_username: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub detail: String,
}

/// Project response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    #[schema(example = "PR001")]
    pub project_code: String,
    #[schema(example = "API Project")]
    pub project_name: String,
    #[schema(example = 2)]
    pub assigned_manager_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub project_detail: String,
    pub project_status: Status,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            project_code: project.code,
            project_name: project.name,
            assigned_manager_id: project.manager_id,
            start_date: project.start_date,
            end_date: project.end_date,
            project_detail: project.detail,
            project_status: project.status,
        }
    }
}

/// A project with its task progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub completed_task_count: u64,
    pub unfinished_task_count: u64,
}
