//! Identity provider port.
//!
//! The external identity provider is the system of record for
//! credentials; local users are mirrored into it on create and removed
//! from it on delete.

use async_trait::async_trait;

use crate::domain::User;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account operations against the external identity provider.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account for `user` with a plaintext `password`.
    async fn create_account(&self, user: &User, password: &str) -> AppResult<()>;

    /// Remove the account registered under `username`.
    async fn remove_account(&self, username: &str) -> AppResult<()>;
}

/// Provider used when no identity provider is configured. Only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledIdentityProvider;

#[async_trait]
impl IdentityProvider for DisabledIdentityProvider {
    async fn create_account(&self, user: &User, _password: &str) -> AppResult<()> {
        tracing::debug!(username = %user.username, "Identity provider disabled, account not mirrored");
        Ok(())
    }

    async fn remove_account(&self, username: &str) -> AppResult<()> {
        tracing::debug!(username, "Identity provider disabled, account not removed");
        Ok(())
    }
}
