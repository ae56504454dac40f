//! Repository and security ports for user accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cultiva_core::{AppResult, AuthClaims, Role};
use cultiva_domain::UserId;

/// User record returned by repository queries.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Canonical lowercased email address.
    pub email: String,
    /// Authorization role.
    pub role: Role,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Canonical lowercased email address, unique per account.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Authorization role.
    pub role: Role,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by canonical email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by identifier.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<UserRecord>>;

    /// Creates a user record. Fails with a conflict when the email is
    /// already registered.
    async fn insert(&self, user: &NewUser) -> AppResult<UserRecord>;

    /// Returns every user, oldest first.
    async fn list_all(&self) -> AppResult<Vec<UserRecord>>;
}

/// Port for password hashing. Keeps the application layer free of direct
/// cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Port for signed bearer tokens.
pub trait TokenIssuer: Send + Sync {
    /// Issues a signed token for the given claims.
    fn issue(&self, claims: &AuthClaims) -> AppResult<String>;

    /// Verifies a token and returns its claims. Invalid or expired tokens
    /// are an authorization error.
    fn verify(&self, token: &str) -> AppResult<AuthClaims>;
}
