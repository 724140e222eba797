//! User role classification.

use serde::{Deserialize, Serialize};

use crate::config::{ROLE_ADMIN, ROLE_EMPLOYEE, ROLE_MANAGER};

/// Role of a user.
///
/// Parsed case-insensitively from its description. Descriptions outside
/// the three known roles are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Manager,
    Employee,
    Other(String),
}

impl Role {
    /// Canonical description stored in the database.
    pub fn description(&self) -> &str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Manager => ROLE_MANAGER,
            Role::Employee => ROLE_EMPLOYEE,
            Role::Other(description) => description,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// True when this role is one of `allowed`.
    pub fn is_any_of(&self, allowed: &[Role]) -> bool {
        allowed.contains(self)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case(ROLE_ADMIN) {
            Role::Admin
        } else if s.eq_ignore_ascii_case(ROLE_MANAGER) {
            Role::Manager
        } else if s.eq_ignore_ascii_case(ROLE_EMPLOYEE) {
            Role::Employee
        } else {
            Role::Other(s.to_string())
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::from(s.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(description) => description,
            known => known.description().to_string(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("MANAGER"), Role::Manager);
        assert_eq!(Role::from(" Employee "), Role::Employee);
    }

    #[test]
    fn test_unknown_role_kept_verbatim() {
        assert_eq!(Role::from("Auditor"), Role::Other("Auditor".to_string()));
        assert_eq!(Role::from("Auditor").to_string(), "Auditor");
    }

    #[test]
    fn test_display_uses_canonical_description() {
        assert_eq!(Role::Admin.to_string(), "Admin");
        assert_eq!(Role::from("employee").to_string(), "Employee");
    }

    #[test]
    fn test_serde_round_trips_as_string() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "\"Manager\"");
        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Manager);
    }

    #[test]
    fn test_is_any_of() {
        assert!(Role::Manager.is_any_of(&[Role::Admin, Role::Manager]));
        assert!(!Role::Employee.is_any_of(&[Role::Admin, Role::Manager]));
    }
}
