use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppError, AppResult};

/// Authorization role carried by every account and bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access to catalog and audit operations.
    Admin,
    /// Regular account without administrative access.
    User,
}

impl Role {
    /// Returns the storage string for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Parses a storage string into a role.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Verified identity extracted from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthClaims {
    user_id: Uuid,
    role: Role,
}

impl AuthClaims {
    /// Creates claims from a verified token payload.
    #[must_use]
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Returns the authenticated user's identifier.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Returns the authenticated user's role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns true when the claims grant administrative access.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
