//! User account application service.
//!
//! Owns registration, listing, and password login. Password hashing and
//! token signing stay behind their ports.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cultiva_core::{AppError, AppResult, AuthClaims, Role};
use cultiva_domain::{EmailAddress, UserId, validate_password};

use crate::{NewUser, PasswordHasher, TokenIssuer, UserRecord, UserRepository};

/// Parameters for user registration.
#[derive(Debug, Clone)]
pub struct RegisterParams {
    /// Display name for the new account.
    pub name: String,
    /// Email address for the new account.
    pub email: String,
    /// Plaintext password, validated before hashing.
    pub password: String,
    /// Requested role; defaults to [`Role::User`] when absent.
    pub role: Option<Role>,
}

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct UserProfile {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Canonical email address.
    pub email: String,
    /// Authorization role.
    pub role: Role,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            role: record.role,
            created_at: record.created_at,
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    /// Signed bearer token for subsequent requests.
    pub token: String,
    /// The authenticated account.
    pub user: UserProfile,
}

/// Application service for user accounts and authentication.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_issuer: Arc<dyn TokenIssuer>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            password_hasher,
            token_issuer,
        }
    }

    /// Registers a new account.
    pub async fn register(&self, params: RegisterParams) -> AppResult<UserProfile> {
        if params.name.trim().is_empty() {
            return Err(AppError::Validation(
                "name must be a valid string".to_owned(),
            ));
        }

        let email = EmailAddress::new(&params.email)?;
        validate_password(&params.password)?;

        if self.users.find_by_email(email.as_str()).await?.is_some() {
            return Err(AppError::Conflict("email already registered".to_owned()));
        }

        let password_hash = self.password_hasher.hash_password(&params.password)?;
        let record = self
            .users
            .insert(&NewUser {
                name: params.name.trim().to_owned(),
                email: email.as_str().to_owned(),
                password_hash,
                role: params.role.unwrap_or(Role::User),
            })
            .await?;

        Ok(record.into())
    }

    /// Returns every account, oldest first.
    pub async fn list_users(&self) -> AppResult<Vec<UserProfile>> {
        let users = self.users.list_all().await?;
        if users.is_empty() {
            return Err(AppError::NotFound("no users found".to_owned()));
        }
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    /// Authenticates an account with email and password and issues a token.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginSuccess> {
        let normalized = email.trim().to_lowercase();

        let user = self
            .users
            .find_by_email(&normalized)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

        let password_valid = self
            .password_hasher
            .verify_password(password, &user.password_hash)?;
        if !password_valid {
            return Err(AppError::Unauthorized(
                "invalid email or password".to_owned(),
            ));
        }

        let claims = AuthClaims::new(user.id.as_uuid(), user.role);
        let token = self.token_issuer.issue(&claims)?;

        Ok(LoginSuccess {
            token,
            user: user.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use cultiva_core::{AppError, AppResult, AuthClaims, Role};
    use cultiva_domain::UserId;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use super::{RegisterParams, UserService};
    use crate::{NewUser, PasswordHasher, TokenIssuer, UserRecord, UserRepository};

    struct FakeUserRepository {
        users: Mutex<HashMap<String, UserRecord>>,
    }

    impl FakeUserRepository {
        fn new() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepository {
        async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
            Ok(self.users.lock().await.get(email).cloned())
        }

        async fn find_by_id(&self, id: UserId) -> AppResult<Option<UserRecord>> {
            Ok(self
                .users
                .lock()
                .await
                .values()
                .find(|record| record.id == id)
                .cloned())
        }

        async fn insert(&self, user: &NewUser) -> AppResult<UserRecord> {
            let mut users = self.users.lock().await;
            if users.contains_key(&user.email) {
                return Err(AppError::Conflict("email already registered".to_owned()));
            }
            let record = UserRecord {
                id: UserId::new(),
                name: user.name.clone(),
                email: user.email.clone(),
                role: user.role,
                password_hash: user.password_hash.clone(),
                created_at: Utc::now(),
            };
            users.insert(user.email.clone(), record.clone());
            Ok(record)
        }

        async fn list_all(&self) -> AppResult<Vec<UserRecord>> {
            let mut listed: Vec<UserRecord> = self.users.lock().await.values().cloned().collect();
            listed.sort_by(|left, right| left.created_at.cmp(&right.created_at));
            Ok(listed)
        }
    }

    struct FakePasswordHasher;

    impl PasswordHasher for FakePasswordHasher {
        fn hash_password(&self, password: &str) -> AppResult<String> {
            Ok(format!("hashed:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
            Ok(hash == format!("hashed:{password}"))
        }
    }

    struct FakeTokenIssuer;

    impl TokenIssuer for FakeTokenIssuer {
        fn issue(&self, claims: &AuthClaims) -> AppResult<String> {
            Ok(format!("token:{}:{}", claims.user_id(), claims.role().as_str()))
        }

        fn verify(&self, token: &str) -> AppResult<AuthClaims> {
            let mut parts = token.split(':').skip(1);
            let user_id = parts
                .next()
                .and_then(|value| Uuid::parse_str(value).ok())
                .ok_or_else(|| AppError::Unauthorized("invalid token".to_owned()))?;
            let role = parts
                .next()
                .and_then(|value| Role::parse(value).ok())
                .ok_or_else(|| AppError::Unauthorized("invalid token".to_owned()))?;
            Ok(AuthClaims::new(user_id, role))
        }
    }

    fn service() -> UserService {
        UserService::new(
            Arc::new(FakeUserRepository::new()),
            Arc::new(FakePasswordHasher),
            Arc::new(FakeTokenIssuer),
        )
    }

    fn params(email: &str) -> RegisterParams {
        RegisterParams {
            name: "Ada".to_owned(),
            email: email.to_owned(),
            password: "long-enough-password".to_owned(),
            role: None,
        }
    }

    #[tokio::test]
    async fn registration_defaults_to_the_user_role() -> AppResult<()> {
        let service = service();
        let profile = service.register(params("ada@example.com")).await?;
        assert_eq!(profile.role, Role::User);
        assert_eq!(profile.email, "ada@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() -> AppResult<()> {
        let service = service();
        service.register(params("ada@example.com")).await?;

        let result = service.register(params("Ada@Example.com")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn short_passwords_are_rejected() {
        let service = service();
        let mut short = params("ada@example.com");
        short.password = "seven77".to_owned();
        assert!(matches!(
            service.register(short).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn login_with_unknown_email_is_not_found() {
        let service = service();
        let result = service.login("ghost@example.com", "irrelevant").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn login_with_a_wrong_password_is_unauthorized() -> AppResult<()> {
        let service = service();
        service.register(params("ada@example.com")).await?;

        let result = service.login("ada@example.com", "wrong-password").await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        Ok(())
    }

    #[tokio::test]
    async fn login_issues_a_token_carrying_the_role() -> AppResult<()> {
        let service = service();
        let mut admin = params("root@example.com");
        admin.role = Some(Role::Admin);
        service.register(admin).await?;

        let success = service
            .login(" Root@Example.com ", "long-enough-password")
            .await?;
        assert!(success.token.ends_with(":admin"));
        assert_eq!(success.user.role, Role::Admin);
        Ok(())
    }

    #[tokio::test]
    async fn listing_with_no_accounts_is_not_found() {
        let service = service();
        assert!(matches!(
            service.list_users().await,
            Err(AppError::NotFound(_))
        ));
    }
}
