//! PostgreSQL-backed repository for user accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use cultiva_application::{NewUser, UserRecord, UserRepository};
use cultiva_core::{AppError, AppResult, Role};
use cultiva_domain::UserId;

/// PostgreSQL-backed repository for user persistence.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> AppResult<UserRecord> {
        let role = Role::parse(&self.role)
            .map_err(|error| AppError::Internal(format!("corrupt user row: {error}")))?;

        Ok(UserRecord {
            id: UserId::from_uuid(self.id),
            name: self.name,
            email: self.email,
            role,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, password_hash, created_at
            FROM users
            WHERE email = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to look up user: {error}")))?;

        row.map(UserRow::into_record).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user: {error}")))?;

        row.map(UserRow::into_record).transpose()
    }

    async fn insert(&self, user: &NewUser) -> AppResult<UserRecord> {
        let id = UserId::new();

        let created_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            INSERT INTO users (id, name, email, role, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| match error {
            // The unique index on email closes the registration race: the
            // losing writer surfaces the same conflict as the upfront check.
            sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
                AppError::Conflict("email already registered".to_owned())
            }
            other => AppError::Internal(format!("failed to create user: {other}")),
        })?;

        Ok(UserRecord {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            password_hash: user.password_hash.clone(),
            created_at,
        })
    }

    async fn list_all(&self) -> AppResult<Vec<UserRecord>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, password_hash, created_at
            FROM users
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?;

        rows.into_iter().map(UserRow::into_record).collect()
    }
}
