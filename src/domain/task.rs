//! Task domain entity and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Status;

/// Task domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub employee_id: i64,
    pub subject: String,
    pub detail: String,
    pub status: Status,
    pub assigned_date: NaiveDate,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_assigned_to(&self, employee_id: i64) -> bool {
        self.employee_id == employee_id
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.updated_at = Utc::now();
    }
}

/// Column values for a task row about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskData {
    pub project_id: i64,
    pub employee_id: i64,
    pub subject: String,
    pub detail: String,
    pub assigned_date: NaiveDate,
}

/// Task as requested by a client; references are resolved by key.
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub project_code: String,
    pub employee_username: String,
    pub subject: String,
    pub detail: String,
}

/// Task response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    #[schema(example = 1)]
    pub id: i64,
    pub project_id: i64,
    pub assigned_employee_id: i64,
    #[schema(example = "Write endpoint tests")]
    pub task_subject: String,
    pub task_detail: String,
    pub task_status: Status,
    pub assigned_date: NaiveDate,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            project_id: task.project_id,
            assigned_employee_id: task.employee_id,
            task_subject: task.subject,
            task_detail: task.detail,
            task_status: task.status,
            assigned_date: task.assigned_date,
        }
    }
}
