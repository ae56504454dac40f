//! PostgreSQL-backed adapter for the activity log.
//!
//! Implements both the write port used by catalog services and the
//! read/cleanup port used by the activity-log service. Referenced users and
//! products are resolved with best-effort LEFT JOINs; the raw identifiers
//! survive the referenced record's deletion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use cultiva_application::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogRepository, ActivityRecorder, ActorSummary,
    NewActivityLog, ProductSummary,
};
use cultiva_core::{AppError, AppResult, Role};
use cultiva_domain::{ActivityAction, ActivityLogId, ProductId, UserId};

const ENTRY_COLUMNS: &str = "logs.id, logs.action, logs.user_id, logs.product_id, logs.changes, \
     logs.created_at, users.name AS user_name, users.email AS user_email, \
     users.role AS user_role, products.name AS product_name, products.image AS product_image";

const ENTRY_JOINS: &str = "LEFT JOIN users ON users.id = logs.user_id \
     LEFT JOIN products ON products.id = logs.product_id";

const FILTER_PREDICATE: &str = "($1::TEXT IS NULL OR logs.action = $1) \
     AND ($2::UUID IS NULL OR logs.user_id = $2) \
     AND ($3::UUID IS NULL OR logs.product_id = $3) \
     AND ($4::TIMESTAMPTZ IS NULL OR logs.created_at >= $4) \
     AND ($5::TIMESTAMPTZ IS NULL OR logs.created_at <= $5)";

/// The single place the cutoff comparison is chosen, shared by the preview
/// listing and the destructive delete so the two cannot drift apart.
fn cutoff_operator(inclusive: bool) -> &'static str {
    if inclusive { "<=" } else { "<" }
}

/// PostgreSQL-backed activity-log adapter.
#[derive(Clone)]
pub struct PostgresActivityLogRepository {
    pool: PgPool,
}

impl PostgresActivityLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ActivityLogRow {
    id: Uuid,
    action: String,
    user_id: Uuid,
    product_id: Option<Uuid>,
    changes: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    user_name: Option<String>,
    user_email: Option<String>,
    user_role: Option<String>,
    product_name: Option<String>,
    product_image: Option<String>,
}

impl ActivityLogRow {
    fn into_entry(self) -> AppResult<ActivityLogEntry> {
        let action = ActivityAction::parse(&self.action)
            .map_err(|error| AppError::Internal(format!("corrupt activity log row: {error}")))?;

        let user = match (self.user_name, self.user_email, self.user_role) {
            (Some(name), Some(email), Some(role)) => Some(ActorSummary {
                name,
                email,
                role: Role::parse(&role).map_err(|error| {
                    AppError::Internal(format!("corrupt activity log row: {error}"))
                })?,
            }),
            _ => None,
        };

        let product = match (self.product_name, self.product_image) {
            (Some(name), Some(image)) => Some(ProductSummary { name, image }),
            _ => None,
        };

        Ok(ActivityLogEntry {
            id: ActivityLogId::from_uuid(self.id),
            action,
            user_id: UserId::from_uuid(self.user_id),
            product_id: self.product_id.map(ProductId::from_uuid),
            user,
            product,
            changes: self.changes,
            created_at: self.created_at,
        })
    }
}

fn rows_into_entries(rows: Vec<ActivityLogRow>) -> AppResult<Vec<ActivityLogEntry>> {
    rows.into_iter().map(ActivityLogRow::into_entry).collect()
}

#[async_trait]
impl ActivityRecorder for PostgresActivityLogRepository {
    async fn record(&self, entry: NewActivityLog) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, action, user_id, product_id, changes)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(ActivityLogId::new().as_uuid())
        .bind(entry.action.as_str())
        .bind(entry.user_id.as_uuid())
        .bind(entry.product_id.map(|id| id.as_uuid()))
        .bind(entry.changes)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to record activity: {error}")))?;

        Ok(())
    }
}

#[async_trait]
impl ActivityLogRepository for PostgresActivityLogRepository {
    async fn count(&self, filter: &ActivityLogFilter) -> AppResult<u64> {
        let query =
            format!("SELECT COUNT(*) FROM activity_logs AS logs WHERE {FILTER_PREDICATE}");

        let total = sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.action.as_deref())
            .bind(filter.user_id.map(|id| id.as_uuid()))
            .bind(filter.product_id.map(|id| id.as_uuid()))
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to count activity logs: {error}"))
            })?;

        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn list(
        &self,
        filter: &ActivityLogFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ActivityLogEntry>> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM activity_logs AS logs {ENTRY_JOINS} \
             WHERE {FILTER_PREDICATE} ORDER BY logs.created_at DESC, logs.id \
             LIMIT $6 OFFSET $7"
        );

        let rows = sqlx::query_as::<_, ActivityLogRow>(&query)
            .bind(filter.action.as_deref())
            .bind(filter.user_id.map(|id| id.as_uuid()))
            .bind(filter.product_id.map(|id| id.as_uuid()))
            .bind(filter.from)
            .bind(filter.to)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list activity logs: {error}"))
            })?;

        rows_into_entries(rows)
    }

    async fn list_matching(&self, filter: &ActivityLogFilter) -> AppResult<Vec<ActivityLogEntry>> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM activity_logs AS logs {ENTRY_JOINS} \
             WHERE {FILTER_PREDICATE} ORDER BY logs.created_at DESC, logs.id"
        );

        let rows = sqlx::query_as::<_, ActivityLogRow>(&query)
            .bind(filter.action.as_deref())
            .bind(filter.user_id.map(|id| id.as_uuid()))
            .bind(filter.product_id.map(|id| id.as_uuid()))
            .bind(filter.from)
            .bind(filter.to)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to export activity logs: {error}"))
            })?;

        rows_into_entries(rows)
    }

    async fn delete(&self, id: ActivityLogId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM activity_logs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete activity log: {error}"))
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_older_than(
        &self,
        cutoff: DateTime<Utc>,
        inclusive: bool,
    ) -> AppResult<Vec<ActivityLogEntry>> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM activity_logs AS logs {ENTRY_JOINS} \
             WHERE logs.created_at {operator} $1 ORDER BY logs.created_at DESC, logs.id",
            operator = cutoff_operator(inclusive),
        );

        let rows = sqlx::query_as::<_, ActivityLogRow>(&query)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list expired activity logs: {error}"))
            })?;

        rows_into_entries(rows)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>, inclusive: bool) -> AppResult<u64> {
        let query = format!(
            "DELETE FROM activity_logs WHERE created_at {operator} $1",
            operator = cutoff_operator(inclusive),
        );

        let result = sqlx::query(&query)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete expired activity logs: {error}"))
            })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::cutoff_operator;

    #[test]
    fn inclusive_and_exclusive_cutoffs_use_distinct_operators() {
        assert_eq!(cutoff_operator(true), "<=");
        assert_eq!(cutoff_operator(false), "<");
    }
}
