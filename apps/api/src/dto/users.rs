use chrono::{DateTime, Utc};
use cultiva_application::UserProfile;
use cultiva_core::{AppResult, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload for user registration.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

impl CreateUserRequest {
    /// Resolves the requested role; absent means a regular user.
    pub fn role(&self) -> AppResult<Option<Role>> {
        self.role.as_deref().map(Role::parse).transpose()
    }
}

/// API representation of a user account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id.as_uuid(),
            name: profile.name,
            email: profile.email,
            role: profile.role,
            created_at: profile.created_at,
        }
    }
}

/// Response for a successful registration.
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub message: String,
    pub user: UserResponse,
}

/// User list with its size.
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub count: usize,
    pub users: Vec<UserResponse>,
}

/// Payload for password login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}
