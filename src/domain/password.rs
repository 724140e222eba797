//! Argon2 credential hashing.
//!
//! Stored values are PHC strings. On update an incoming value equal to the
//! stored hash is an echo of what the client was sent, not a new password.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// A hashed credential. Never holds plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl Password {
    /// Hash a new plaintext credential (at least `MIN_PASSWORD_LENGTH` chars).
    pub fn new(plain_text: &str) -> AppResult<Self> {
        ensure_length(plain_text)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();

        Ok(Self { hash })
    }

    /// Wrap a hash loaded from storage.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Hash to persist on update.
    ///
    /// `None`, or a value equal to the stored hash, keeps the stored hash.
    /// Anything else is a new plaintext credential and gets hashed.
    pub fn for_update(stored_hash: &str, incoming: Option<&str>) -> AppResult<Self> {
        match incoming {
            Some(plain_text) if plain_text != stored_hash => Self::new(plain_text),
            _ => Ok(Self::from_hash(stored_hash.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// False for a wrong password and for an unparseable stored hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::debug!("Stored hash is not a PHC string: {}", e);
                false
            }
        }
    }
}

fn ensure_length(plain_text: &str) -> AppResult<()> {
    if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_only_its_plaintext() {
        let password = Password::new("Abc12345").unwrap();

        assert!(password.as_str().starts_with("$argon2"));
        assert!(password.verify("Abc12345"));
        assert!(!password.verify("Abc123456"));
    }

    #[test]
    fn test_minimum_length() {
        assert!(matches!(Password::new("short"), Err(AppError::Validation(_))));
        assert!(Password::new("12345678").is_ok());
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!Password::from_hash("plain".to_string()).verify("plain"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = Password::new("Abc12345").unwrap();
        assert_eq!(format!("{:?}", password), "Password([REDACTED])");
    }

    #[test]
    fn test_update_without_password_keeps_hash() {
        let stored = Password::new("Original123").unwrap().into_string();
        let resolved = Password::for_update(&stored, None).unwrap();
        assert_eq!(resolved.as_str(), stored);
    }

    #[test]
    fn test_update_with_echoed_hash_does_not_double_hash() {
        let stored = Password::new("Original123").unwrap().into_string();
        let resolved = Password::for_update(&stored, Some(&stored)).unwrap();
        assert_eq!(resolved.as_str(), stored);
        assert!(resolved.verify("Original123"));
    }

    #[test]
    fn test_update_with_new_plaintext_rehashes() {
        let stored = Password::new("Original123").unwrap().into_string();
        let resolved = Password::for_update(&stored, Some("Changed456!")).unwrap();
        assert_ne!(resolved.as_str(), stored);
        assert!(resolved.verify("Changed456!"));
    }
}
