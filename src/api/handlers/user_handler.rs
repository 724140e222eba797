//! User handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_any_role, CurrentUser};
use crate::api::AppState;
use crate::config::MAX_USERNAME_LENGTH;
use crate::domain::{Gender, NewUser, Role, UserChanges, UserResponse};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// User creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 2, max = 50, message = "First name must be 2 to 50 characters"))]
    #[schema(example = "Harold")]
    pub first_name: String,
    #[validate(length(min = 2, max = 50, message = "Last name must be 2 to 50 characters"))]
    #[schema(example = "Finch")]
    pub last_name: String,
    #[validate(length(min = 1, max = MAX_USERNAME_LENGTH, message = "Username is required"))]
    #[schema(example = "harold@manager.com")]
    pub user_name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "Abc12345", min_length = 8)]
    pub pass_word: String,
    #[schema(example = "5551234567")]
    pub phone: String,
    #[schema(example = "Manager")]
    pub role: String,
    pub gender: Gender,
}

/// User update request, keyed by username.
///
/// Omitting `passWord`, or echoing the stored hash, keeps the password.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 50, message = "First name must be 2 to 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 50, message = "Last name must be 2 to 50 characters"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "Username is required"))]
    pub user_name: String,
    pub pass_word: Option<String>,
    pub phone: String,
    pub role: String,
    pub gender: Gender,
    pub enabled: Option<bool>,
}

/// Optional filter for the user listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    /// Role description, matched case-insensitively
    #[param(example = "Manager")]
    pub role: Option<String>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user).put(update_user))
        .route("/:username", get(get_user).delete(delete_user))
}

/// List active users, optionally narrowed to one role
#[utoipa::path(
    get,
    path = "/api/v1/user",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(UserFilter),
    responses(
        (status = 200, description = "Users are successfully retrieved", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    require_any_role(&current_user, &[Role::Manager, Role::Admin])?;

    let users = match filter.role.as_deref().map(str::trim) {
        Some(role) if !role.is_empty() => state.user_service.list_by_role(role).await?,
        _ => state.user_service.list_users().await?,
    };
    Ok(ApiResponse::ok(
        "Users are successfully retrieved",
        users.into_iter().map(UserResponse::from).collect(),
    ))
}

/// Get active user by username
#[utoipa::path(
    get,
    path = "/api/v1/user/{username}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User is successfully retrieved", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No User Found")
    )
)]
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_any_role(&current_user, &[Role::Manager, Role::Admin])?;

    let user = state.user_service.find_by_username(&username).await?;
    Ok(ApiResponse::ok(
        "User is successfully retrieved",
        UserResponse::from(user),
    ))
}

/// Create a user (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/user",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User is successfully created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "User already exists"),
        (status = 502, description = "Identity provider error")
    )
)]
pub async fn create_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_any_role(&current_user, &[Role::Admin])?;

    let user = state
        .user_service
        .create_user(NewUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            username: payload.user_name,
            password: payload.pass_word,
            phone: payload.phone,
            role: Role::from(payload.role),
            gender: payload.gender,
        })
        .await?;

    Ok(ApiResponse::created(
        "User is successfully created",
        UserResponse::from(user),
    ))
}

/// Update a user (admin only)
#[utoipa::path(
    put,
    path = "/api/v1/user",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User is successfully updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No User Found")
    )
)]
pub async fn update_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_any_role(&current_user, &[Role::Admin])?;

    let user = state
        .user_service
        .update_user(UserChanges {
            username: payload.user_name,
            first_name: payload.first_name,
            last_name: payload.last_name,
            password: payload.pass_word.filter(|p| !p.is_empty()),
            phone: payload.phone,
            role: Role::from(payload.role),
            gender: payload.gender,
            enabled: payload.enabled,
        })
        .await?;

    Ok(ApiResponse::ok(
        "User is successfully updated",
        UserResponse::from(user),
    ))
}

/// Soft delete a user (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/user/{username}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User is successfully deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No User Found"),
        (status = 409, description = "User can not be deleted"),
        (status = 502, description = "Identity provider error")
    )
)]
pub async fn delete_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_any_role(&current_user, &[Role::Admin])?;

    state.user_service.delete_user(&username).await?;
    Ok(ApiResponse::message("User is successfully deleted"))
}
