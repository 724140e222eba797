//! Task handlers.

use axum::{
    extract::{Extension, Path, State},
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_any_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Role, Status, TaskRequest, TaskResponse};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Task create request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "Project code is required"))]
    #[schema(example = "PR001")]
    pub project_code: String,
    /// Username of the assigned employee
    #[validate(length(min = 1, message = "Assigned employee is required"))]
    #[schema(example = "mike@employee.com")]
    pub assigned_employee: String,
    #[validate(length(min = 1, message = "Task subject is required"))]
    pub task_subject: String,
    #[validate(length(min = 1, message = "Task detail is required"))]
    pub task_detail: String,
}

impl From<CreateTaskRequest> for TaskRequest {
    fn from(body: CreateTaskRequest) -> Self {
        Self {
            project_code: body.project_code,
            employee_username: body.assigned_employee,
            subject: body.task_subject,
            detail: body.task_detail,
        }
    }
}

/// Task update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub id: i64,
    #[validate(nested)]
    #[serde(flatten)]
    pub task: CreateTaskRequest,
    pub task_status: Option<Status>,
}

/// Employee status change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusRequest {
    pub id: i64,
    pub task_status: Status,
}

/// Create task routes
pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task).put(update_task))
        .route("/:id", get(get_task).delete(delete_task))
        .route("/employee/pending-tasks", get(pending_tasks))
        .route("/employee/archive", get(archived_tasks))
        .route("/employee/update", put(update_status))
}

#[utoipa::path(
    get,
    path = "/api/v1/task",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Tasks are successfully retrieved", body = Vec<TaskResponse>))
)]
pub async fn list_tasks(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<TaskResponse>>> {
    require_any_role(&current_user, &[Role::Manager])?;

    let tasks = state.task_service.list_tasks().await?;
    Ok(ApiResponse::ok(
        "Tasks are successfully retrieved",
        tasks.into_iter().map(TaskResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/task/{id}",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task is successfully retrieved", body = TaskResponse),
        (status = 404, description = "No Task Found")
    )
)]
pub async fn get_task(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<TaskResponse>> {
    require_any_role(&current_user, &[Role::Manager])?;

    let task = state.task_service.get_task(id).await?;
    Ok(ApiResponse::ok(
        "Task is successfully retrieved",
        TaskResponse::from(task),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/task",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task is successfully created", body = TaskResponse),
        (status = 404, description = "Project or employee not found")
    )
)]
pub async fn create_task(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTaskRequest>,
) -> AppResult<ApiResponse<TaskResponse>> {
    require_any_role(&current_user, &[Role::Manager])?;

    let task = state.task_service.create_task(payload.into()).await?;
    Ok(ApiResponse::created(
        "Task is successfully created",
        TaskResponse::from(task),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/task",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task is successfully updated", body = TaskResponse),
        (status = 404, description = "No Task Found")
    )
)]
pub async fn update_task(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateTaskRequest>,
) -> AppResult<ApiResponse<TaskResponse>> {
    require_any_role(&current_user, &[Role::Manager])?;

    let task = state
        .task_service
        .update_task(payload.id, payload.task.into(), payload.task_status)
        .await?;
    Ok(ApiResponse::ok(
        "Task is successfully updated",
        TaskResponse::from(task),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/task/{id}",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task is successfully deleted"),
        (status = 404, description = "No Task Found")
    )
)]
pub async fn delete_task(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    require_any_role(&current_user, &[Role::Manager])?;

    state.task_service.delete_task(id).await?;
    Ok(ApiResponse::message("Task is successfully deleted"))
}

/// Non-completed tasks of the calling employee
#[utoipa::path(
    get,
    path = "/api/v1/task/employee/pending-tasks",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Tasks are successfully retrieved", body = Vec<TaskResponse>))
)]
pub async fn pending_tasks(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<TaskResponse>>> {
    require_any_role(&current_user, &[Role::Employee])?;

    let tasks = state.task_service.pending_tasks(current_user.id).await?;
    Ok(ApiResponse::ok(
        "Tasks are successfully retrieved",
        tasks.into_iter().map(TaskResponse::from).collect(),
    ))
}

/// Completed tasks of the calling employee
#[utoipa::path(
    get,
    path = "/api/v1/task/employee/archive",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Tasks are successfully retrieved", body = Vec<TaskResponse>))
)]
pub async fn archived_tasks(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<TaskResponse>>> {
    require_any_role(&current_user, &[Role::Employee])?;

    let tasks = state.task_service.archived_tasks(current_user.id).await?;
    Ok(ApiResponse::ok(
        "Tasks are successfully retrieved",
        tasks.into_iter().map(TaskResponse::from).collect(),
    ))
}

/// Change the status of one of the caller's tasks
#[utoipa::path(
    put,
    path = "/api/v1/task/employee/update",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    request_body = TaskStatusRequest,
    responses(
        (status = 200, description = "Task is successfully updated", body = TaskResponse),
        (status = 403, description = "Task assigned to someone else")
    )
)]
pub async fn update_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TaskStatusRequest>,
) -> AppResult<ApiResponse<TaskResponse>> {
    require_any_role(&current_user, &[Role::Employee])?;

    let task = state
        .task_service
        .update_status(current_user.id, payload.id, payload.task_status)
        .await?;
    Ok(ApiResponse::ok(
        "Task is successfully updated",
        TaskResponse::from(task),
    ))
}
