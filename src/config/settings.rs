//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_KEYCLOAK_CLIENT_ID,
    DEFAULT_KEYCLOAK_MASTER_CLIENT, DEFAULT_KEYCLOAK_MASTER_REALM, DEFAULT_KEYCLOAK_REALM,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, MIN_JWT_SECRET_LENGTH,
};

/// Keycloak admin API settings. Present only when `KEYCLOAK_URL` is set.
#[derive(Clone)]
pub struct KeycloakConfig {
    pub base_url: String,
    pub realm: String,
    pub client_id: String,
    pub master_realm: String,
    pub master_client: String,
    pub admin_username: String,
    admin_password: String,
}

impl std::fmt::Debug for KeycloakConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakConfig")
            .field("base_url", &self.base_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("master_realm", &self.master_realm)
            .field("master_client", &self.master_client)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"[REDACTED]")
            .finish()
    }
}

impl KeycloakConfig {
    pub fn new(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        admin_username: impl Into<String>,
        admin_password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            realm: realm.into(),
            client_id: client_id.into(),
            master_realm: DEFAULT_KEYCLOAK_MASTER_REALM.to_string(),
            master_client: DEFAULT_KEYCLOAK_MASTER_CLIENT.to_string(),
            admin_username: admin_username.into(),
            admin_password: admin_password.into(),
        }
    }

    fn from_env() -> Option<Self> {
        let base_url = env::var("KEYCLOAK_URL").ok().filter(|v| !v.is_empty())?;

        let mut config = Self::new(
            base_url,
            env::var("KEYCLOAK_REALM").unwrap_or_else(|_| DEFAULT_KEYCLOAK_REALM.to_string()),
            env::var("KEYCLOAK_CLIENT_ID")
                .unwrap_or_else(|_| DEFAULT_KEYCLOAK_CLIENT_ID.to_string()),
            env::var("KEYCLOAK_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            env::var("KEYCLOAK_ADMIN_PASSWORD").unwrap_or_default(),
        );
        if let Ok(realm) = env::var("KEYCLOAK_MASTER_REALM") {
            config.master_realm = realm;
        }
        if let Ok(client) = env::var("KEYCLOAK_MASTER_CLIENT") {
            config.master_client = client;
        }

        Some(config)
    }

    /// Password of the administrative account.
    pub fn admin_password(&self) -> &str {
        &self.admin_password
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub keycloak: Option<KeycloakConfig>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("keycloak", &self.keycloak)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let keycloak = KeycloakConfig::from_env();
        if keycloak.is_none() {
            tracing::warn!("KEYCLOAK_URL not set, identity provider mirroring is disabled");
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            keycloak,
        }
    }

    /// Build a configuration with an explicit secret (tests, embedding).
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            keycloak: None,
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = Config::with_secret("a-very-long-secret-value-for-tests!!");
        config.keycloak = Some(KeycloakConfig::new(
            "http://localhost:8080/",
            "ticketing",
            "ticketing-app",
            "admin",
            "super-secret",
        ));

        let printed = format!("{:?}", config);
        assert!(!printed.contains("a-very-long-secret-value-for-tests!!"));
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn test_keycloak_base_url_trailing_slash_trimmed() {
        let keycloak = KeycloakConfig::new("http://kc:8080/", "r", "c", "u", "p");
        assert_eq!(keycloak.base_url, "http://kc:8080");
        assert_eq!(keycloak.master_realm, "master");
    }

    #[test]
    fn test_server_addr() {
        let config = Config::with_secret("a-very-long-secret-value-for-tests!!");
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
    }
}
