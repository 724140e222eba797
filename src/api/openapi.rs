//! OpenAPI documentation served through Swagger UI.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, project_handler, task_handler, user_handler};
use crate::domain::{Gender, ProjectDetails, ProjectResponse, Status, TaskResponse, UserResponse};
use crate::services::TokenResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ticketing API",
        version = "0.1.0",
        description = "Users, projects and tasks with role based access"
    ),
    servers((url = "http://localhost:3000", description = "Local development server")),
    paths(
        auth_handler::login,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::create_user,
        user_handler::update_user,
        user_handler::delete_user,
        project_handler::list_projects,
        project_handler::get_project,
        project_handler::create_project,
        project_handler::update_project,
        project_handler::delete_project,
        project_handler::complete_project,
        task_handler::list_tasks,
        task_handler::get_task,
        task_handler::create_task,
        task_handler::update_task,
        task_handler::delete_task,
        task_handler::pending_tasks,
        task_handler::archived_tasks,
        task_handler::update_status,
    ),
    components(
        schemas(
            Gender,
            Status,
            UserResponse,
            ProjectResponse,
            ProjectDetails,
            TaskResponse,
            TokenResponse,
            auth_handler::LoginRequest,
            user_handler::CreateUserRequest,
            user_handler::UpdateUserRequest,
            project_handler::ProjectRequestBody,
            task_handler::CreateTaskRequest,
            task_handler::UpdateTaskRequest,
            task_handler::TaskStatusRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Token issuance"),
        (name = "Users", description = "User management"),
        (name = "Projects", description = "Project lifecycle"),
        (name = "Tasks", description = "Task assignment and progress")
    )
)]
pub struct ApiDoc;

/// Registers the JWT bearer scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_delete_user_path() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/v1/user/{username}"));
        assert!(doc.paths.paths.contains_key("/api/v1/task/employee/update"));
    }
}
