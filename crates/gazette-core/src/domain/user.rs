//! User entity and registration validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, FieldViolation};

/// Account role. Admins hold full moderation and deletion authority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity. The password is only ever held as an Argon2 hash; plaintext
/// never reaches this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Raw registration input. [`Registration::validate`] checks every field and
/// resolves the requested role (absent means `user`).
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl Registration {
    pub fn validate(&self) -> Result<Role, DomainError> {
        let mut violations = Vec::new();

        if self.name.trim().is_empty() {
            violations.push(FieldViolation::new("name", "name is required"));
        }
        if !is_plausible_email(&self.email) {
            violations.push(FieldViolation::new("email", "email must be a valid address"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            violations.push(FieldViolation::new(
                "password",
                format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }

        let role = match self.role.as_deref() {
            None | Some("") => Ok(Role::User),
            Some(raw) => raw.parse::<Role>().map_err(|()| {
                violations.push(FieldViolation::new(
                    "role",
                    "role must be \"user\" or \"admin\"",
                ));
            }),
        };

        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        // Unreachable fallback: a role parse failure always records a
        // violation above.
        role.map_err(|()| DomainError::Internal("role".into()))
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
