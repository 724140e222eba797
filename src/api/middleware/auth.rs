//! JWT authentication middleware and role guards.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::Role;
use crate::errors::AppError;

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// JWT authentication middleware.
///
/// Validates the bearer token and injects the CurrentUser into the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token)?;

    let current_user = CurrentUser {
        id: claims.uid,
        username: claims.sub,
        role: Role::from(claims.role),
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Require one of `allowed`, returns Forbidden otherwise.
pub fn require_any_role(user: &CurrentUser, allowed: &[Role]) -> Result<(), AppError> {
    if user.role.is_any_of(allowed) {
        Ok(())
    } else {
        tracing::debug!(username = %user.username, role = %user.role, "Role not permitted");
        Err(AppError::Forbidden)
    }
}
