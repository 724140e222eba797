//! Token issuance.

use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::TokenResponse;
use crate::types::ApiResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "admin@admin.com")]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "Abc12345")]
    pub password: String,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Exchange username and password for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login is successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(LoginRequest { username, password }): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let token = state.auth_service.login(username.clone(), password).await?;

    tracing::info!(%username, "Token issued");
    Ok(ApiResponse::ok("Login is successful", token))
}
