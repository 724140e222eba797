//! Keycloak admin REST client.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::{KeycloakConfig, KEYCLOAK_TIMEOUT_SECONDS};
use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::services::IdentityProvider;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Representation {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialRepresentation<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
    temporary: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserRepresentation<'a> {
    username: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    enabled: bool,
    email_verified: bool,
    credentials: Vec<CredentialRepresentation<'a>>,
}

impl<'a> UserRepresentation<'a> {
    fn new(user: &'a User, password: &'a str) -> Self {
        Self {
            username: &user.username,
            first_name: &user.first_name,
            last_name: &user.last_name,
            email: user.username.contains('@').then_some(user.username.as_str()),
            enabled: true,
            email_verified: true,
            credentials: vec![CredentialRepresentation {
                kind: "password",
                value: password,
                temporary: false,
            }],
        }
    }
}

/// Identity provider backed by the Keycloak admin API.
///
/// Every call obtains a fresh admin token from the master realm.
pub struct KeycloakClient {
    http: Client,
    config: KeycloakConfig,
}

impl KeycloakClient {
    pub fn new(config: KeycloakConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(KEYCLOAK_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn admin_url(&self, path: &str) -> String {
        format!(
            "{}/admin/realms/{}/{}",
            self.config.base_url, self.config.realm, path
        )
    }

    async fn admin_token(&self) -> AppResult<String> {
        let url = format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.config.base_url, self.config.master_realm
        );

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", self.config.master_client.as_str()),
                ("username", self.config.admin_username.as_str()),
                ("password", self.config.admin_password()),
            ])
            .send()
            .await?;

        let token: TokenResponse = ensure_success(response, "admin login").await?.json().await?;
        Ok(token.access_token)
    }

    async fn find_user_id(&self, token: &str, username: &str) -> AppResult<Option<String>> {
        let response = self
            .http
            .get(self.admin_url("users"))
            .bearer_auth(token)
            .query(&[("username", username), ("exact", "true")])
            .send()
            .await?;

        let users: Vec<Representation> = ensure_success(response, "user lookup").await?.json().await?;
        Ok(users.into_iter().next().map(|u| u.id))
    }

    async fn assign_client_role(&self, token: &str, user_id: &str, role: &str) -> AppResult<()> {
        let response = self
            .http
            .get(self.admin_url("clients"))
            .bearer_auth(token)
            .query(&[("clientId", self.config.client_id.as_str())])
            .send()
            .await?;

        let client_uuid = ensure_success(response, "client lookup")
            .await?
            .json::<Vec<Representation>>()
            .await?
            .into_iter()
            .next()
            .map(|c| c.id)
            .ok_or_else(|| {
                AppError::identity_provider(format!("client {} not found", self.config.client_id))
            })?;

        let response = self
            .http
            .get(self.admin_url(&format!("clients/{}/roles/{}", client_uuid, role)))
            .bearer_auth(token)
            .send()
            .await?;
        let role_representation: Value = ensure_success(response, "role lookup").await?.json().await?;

        let response = self
            .http
            .post(self.admin_url(&format!(
                "users/{}/role-mappings/clients/{}",
                user_id, client_uuid
            )))
            .bearer_auth(token)
            .json(&[role_representation])
            .send()
            .await?;
        ensure_success(response, "role assignment").await?;

        Ok(())
    }

    /// Steps after the account exists: resolve its id and map the role.
    async fn finish_account(&self, token: &str, user: &User) -> AppResult<()> {
        let user_id = self
            .find_user_id(token, &user.username)
            .await?
            .ok_or_else(|| AppError::identity_provider("created account not found"))?;

        self.assign_client_role(token, &user_id, user.role.description())
            .await
    }

    /// Delete the account named `username`. `Ok(false)` when Keycloak has none.
    async fn delete_account(&self, token: &str, username: &str) -> AppResult<bool> {
        let Some(user_id) = self.find_user_id(token, username).await? else {
            return Ok(false);
        };

        let response = self
            .http
            .delete(self.admin_url(&format!("users/{}", user_id)))
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        ensure_success(response, "user removal").await?;

        Ok(true)
    }
}

#[async_trait]
impl IdentityProvider for KeycloakClient {
    async fn create_account(&self, user: &User, password: &str) -> AppResult<()> {
        let token = self.admin_token().await?;

        let response = self
            .http
            .post(self.admin_url("users"))
            .bearer_auth(&token)
            .json(&UserRepresentation::new(user, password))
            .send()
            .await?;
        ensure_success(response, "user creation").await?;

        if let Err(e) = self.finish_account(&token, user).await {
            tracing::error!(username = %user.username, error = %e, "Account setup failed, discarding the new account");
            if let Err(cleanup_err) = self.delete_account(&token, &user.username).await {
                tracing::error!(
                    username = %user.username,
                    error = %cleanup_err,
                    "Failed to discard account; identity provider holds an orphan"
                );
            }
            return Err(e);
        }

        tracing::info!(username = %user.username, role = %user.role, "Identity provider account created");
        Ok(())
    }

    async fn remove_account(&self, username: &str) -> AppResult<()> {
        let token = self.admin_token().await?;

        if self.delete_account(&token, username).await? {
            tracing::info!(username, "Identity provider account removed");
        } else {
            tracing::warn!(username, "No identity provider account to remove");
        }
        Ok(())
    }
}

async fn ensure_success(response: Response, action: &str) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::identity_provider(format!(
        "{} failed with HTTP {}: {}",
        action, status, body
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Gender, Role};
    use chrono::Utc;
    use mockito::{Matcher, Server, ServerGuard};

    fn user(username: &str) -> User {
        User {
            id: 1,
            first_name: "Harold".to_string(),
            last_name: "Finch".to_string(),
            username: username.to_string(),
            password_hash: "$argon2id$stored".to_string(),
            phone: "5551234567".to_string(),
            enabled: true,
            is_deleted: false,
            role: Role::Manager,
            gender: Gender::Male,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_representation_carries_plaintext_credential() {
        let harold = user("harold@manager.com");
        let body = serde_json::to_value(UserRepresentation::new(&harold, "Abc12345")).unwrap();

        assert_eq!(body["username"], "harold@manager.com");
        assert_eq!(body["email"], "harold@manager.com");
        assert_eq!(body["firstName"], "Harold");
        assert_eq!(body["credentials"][0]["type"], "password");
        assert_eq!(body["credentials"][0]["value"], "Abc12345");
        assert_eq!(body["credentials"][0]["temporary"], false);
    }

    #[test]
    fn test_representation_omits_email_for_plain_usernames() {
        let ozzy = user("ozzy");
        let body = serde_json::to_value(UserRepresentation::new(&ozzy, "Abc12345")).unwrap();

        assert!(body.get("email").is_none());
    }

    fn client(base_url: impl Into<String>) -> KeycloakClient {
        KeycloakClient::new(KeycloakConfig::new(
            base_url,
            "ticketing",
            "ticketing-app",
            "admin",
            "admin",
        ))
        .unwrap()
    }

    /// Admin login plus the exact-username lookup answering `u-1`.
    async fn token_and_lookup(server: &mut ServerGuard) {
        server
            .mock("POST", "/realms/master/protocol/openid-connect/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"admin-token"}"#)
            .create_async()
            .await;
        server
            .mock("GET", Matcher::Regex(r"^/admin/realms/ticketing/users(\?.*)?$".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"u-1"}]"#)
            .create_async()
            .await;
    }

    #[test]
    fn test_admin_url() {
        let client = client("http://localhost:8080/");

        assert_eq!(
            client.admin_url("users"),
            "http://localhost:8080/admin/realms/ticketing/users"
        );
    }

    #[tokio::test]
    async fn test_create_discards_account_when_role_mapping_fails() {
        let mut server = Server::new_async().await;
        token_and_lookup(&mut server).await;
        server
            .mock("POST", "/admin/realms/ticketing/users")
            .with_status(201)
            .create_async()
            .await;
        server
            .mock("GET", Matcher::Regex(r"^/admin/realms/ticketing/clients(\?.*)?$".to_string()))
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;
        let discard = server
            .mock("DELETE", "/admin/realms/ticketing/users/u-1")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let err = client(server.url())
            .create_account(&user("harold@manager.com"), "Abc12345")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::IdentityProvider(ref msg) if msg.contains("client lookup")));
        discard.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_keeps_nothing_when_creation_is_rejected() {
        let mut server = Server::new_async().await;
        token_and_lookup(&mut server).await;
        server
            .mock("POST", "/admin/realms/ticketing/users")
            .with_status(409)
            .with_body(r#"{"errorMessage":"User exists with same username"}"#)
            .create_async()
            .await;
        let discard = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let result = client(server.url())
            .create_account(&user("harold@manager.com"), "Abc12345")
            .await;

        assert!(matches!(result, Err(AppError::IdentityProvider(_))));
        discard.assert_async().await;
    }

    #[tokio::test]
    async fn test_remove_treats_missing_account_as_removed() {
        let mut server = Server::new_async().await;
        token_and_lookup(&mut server).await;
        server
            .mock("DELETE", "/admin/realms/ticketing/users/u-1")
            .with_status(404)
            .create_async()
            .await;

        assert!(client(server.url()).remove_account("ozzy").await.is_ok());
    }
}
