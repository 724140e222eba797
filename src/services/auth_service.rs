//! Authentication service - issues and verifies locally signed tokens.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

// Never verifies; keeps the timing of unknown-user logins in line with real ones.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$dummyhash1234567890123456789012";

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// User id
    pub uid: i64,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Login and return JWT token
    async fn login(&self, username: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Sign a token for `user`.
pub fn issue_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.username.clone(),
        uid: user.id,
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Verify a token signed with the configured secret.
pub fn verify_token(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(&self, username: String, password: String) -> AppResult<TokenResponse> {
        let found = self.uow.users().find_active_by_username(&username).await?;

        let stored_hash = found
            .as_ref()
            .map(|user| user.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());
        let password_valid = Password::from_hash(stored_hash).verify(&password);

        let user = match found {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        if !user.enabled {
            tracing::warn!(username = %user.username, "Login attempt on disabled account");
            return Err(AppError::InvalidCredentials);
        }

        issue_token(&user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token(token, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::infra::MockUserRepository;
    use crate::services::test_support::{user, MockUow};

    const SECRET: &str = "test-secret-that-is-at-least-32-characters";

    fn authenticator(found: Option<User>) -> Authenticator<MockUow> {
        let mut users = MockUserRepository::new();
        users
            .expect_find_active_by_username()
            .returning(move |_| Ok(found.clone()));
        Authenticator::new(MockUow::with_users(users), Config::with_secret(SECRET))
    }

    fn account(enabled: bool) -> User {
        let mut manager = user(2, "ozzy", Role::Manager);
        manager.password_hash = Password::new("Abc12345").unwrap().into_string();
        manager.enabled = enabled;
        manager
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let auth = authenticator(Some(account(true)));

        let token = auth
            .login("ozzy".to_string(), "Abc12345".to_string())
            .await
            .unwrap();
        let claims = auth.verify_token(&token.access_token).unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(claims.sub, "ozzy");
        assert_eq!(claims.uid, 2);
        assert_eq!(claims.role, "Manager");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let auth = authenticator(Some(account(true)));

        assert!(matches!(
            auth.login("ozzy".to_string(), "wrong-password".to_string()).await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let auth = authenticator(None);

        assert!(matches!(
            auth.login("ghost".to_string(), "Abc12345".to_string()).await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_disabled_user() {
        let auth = authenticator(Some(account(false)));

        assert!(auth
            .login("ozzy".to_string(), "Abc12345".to_string())
            .await
            .is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = issue_token(&account(true), &Config::with_secret(SECRET)).unwrap();
        let other = Config::with_secret("another-secret-that-is-32-characters-long");

        assert!(verify_token(&token.access_token, &other).is_err());
    }
}
