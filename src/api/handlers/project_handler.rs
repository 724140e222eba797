//! Project handlers.

use axum::{
    extract::{Extension, Path, State},
    routing::{get, put},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_any_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{ProjectDetails, ProjectRequest, ProjectResponse, Role};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Project create/update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequestBody {
    #[validate(length(min = 1, message = "Project code is required"))]
    #[schema(example = "PR001")]
    pub project_code: String,
    #[validate(length(min = 1, message = "Project name is required"))]
    #[schema(example = "API Project")]
    pub project_name: String,
    /// Username of the assigned manager
    #[validate(length(min = 1, message = "Assigned manager is required"))]
    #[schema(example = "harold@manager.com")]
    pub assigned_manager: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 1, message = "Project detail is required"))]
    pub project_detail: String,
}

impl From<ProjectRequestBody> for ProjectRequest {
    fn from(body: ProjectRequestBody) -> Self {
        Self {
            code: body.project_code,
            name: body.project_name,
            manager_username: body.assigned_manager,
            start_date: body.start_date,
            end_date: body.end_date,
            detail: body.project_detail,
        }
    }
}

/// Create project routes
pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project).put(update_project))
        .route("/:code", get(get_project).delete(delete_project))
        .route("/complete/:code", put(complete_project))
}

/// List projects with task counts.
///
/// Managers see their own projects, admins see every project.
#[utoipa::path(
    get,
    path = "/api/v1/project",
    tag = "Projects",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Projects are successfully retrieved", body = Vec<ProjectDetails>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_projects(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ProjectDetails>>> {
    require_any_role(&current_user, &[Role::Manager, Role::Admin])?;

    let manager_id = (!current_user.is_admin()).then_some(current_user.id);
    let details = state.project_service.list_project_details(manager_id).await?;
    Ok(ApiResponse::ok("Projects are successfully retrieved", details))
}

#[utoipa::path(
    get,
    path = "/api/v1/project/{code}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Project code")),
    responses(
        (status = 200, description = "Project is successfully retrieved", body = ProjectResponse),
        (status = 404, description = "No Project Found")
    )
)]
pub async fn get_project(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<ApiResponse<ProjectResponse>> {
    require_any_role(&current_user, &[Role::Manager])?;

    let project = state.project_service.get_by_code(&code).await?;
    Ok(ApiResponse::ok(
        "Project is successfully retrieved",
        ProjectResponse::from(project),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/project",
    tag = "Projects",
    security(("bearer_auth" = [])),
    request_body = ProjectRequestBody,
    responses(
        (status = 201, description = "Project is successfully created", body = ProjectResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Project already exists")
    )
)]
pub async fn create_project(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProjectRequestBody>,
) -> AppResult<ApiResponse<ProjectResponse>> {
    require_any_role(&current_user, &[Role::Admin, Role::Manager])?;

    let project = state.project_service.create_project(payload.into()).await?;
    Ok(ApiResponse::created(
        "Project is successfully created",
        ProjectResponse::from(project),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/project",
    tag = "Projects",
    security(("bearer_auth" = [])),
    request_body = ProjectRequestBody,
    responses(
        (status = 200, description = "Project is successfully updated", body = ProjectResponse),
        (status = 404, description = "No Project Found")
    )
)]
pub async fn update_project(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProjectRequestBody>,
) -> AppResult<ApiResponse<ProjectResponse>> {
    require_any_role(&current_user, &[Role::Manager])?;

    let project = state.project_service.update_project(payload.into()).await?;
    Ok(ApiResponse::ok(
        "Project is successfully updated",
        ProjectResponse::from(project),
    ))
}

/// Soft delete a project and its tasks
#[utoipa::path(
    delete,
    path = "/api/v1/project/{code}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Project code")),
    responses(
        (status = 200, description = "Project is successfully deleted"),
        (status = 404, description = "No Project Found")
    )
)]
pub async fn delete_project(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_any_role(&current_user, &[Role::Manager])?;

    state.project_service.delete_project(&code).await?;
    Ok(ApiResponse::message("Project is successfully deleted"))
}

/// Complete a project and all of its tasks
#[utoipa::path(
    put,
    path = "/api/v1/project/complete/{code}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Project code")),
    responses(
        (status = 200, description = "Project is successfully completed"),
        (status = 404, description = "No Project Found")
    )
)]
pub async fn complete_project(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_any_role(&current_user, &[Role::Manager])?;

    state.project_service.complete_project(&code).await?;
    Ok(ApiResponse::message("Project is successfully completed"))
}
