//! Activity-log application service.
//!
//! Listing, single deletion, CSV export, and the retention cleanup pair:
//! a read-only preview and a destructive execute sharing one cutoff rule
//! per policy.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cultiva_core::{AppError, AppResult};
use cultiva_domain::{ActivityLogId, RetentionPolicy, compute_cutoff};

use crate::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogPage, ActivityLogQuery, ActivityLogRepository,
};

/// CSV header for activity-log exports.
const CSV_HEADER: &str = "Action,User Name,User Email,Product Name,Product ID,Date";

/// Result of a read-only cleanup preview.
#[derive(Debug, Clone)]
pub struct CleanupPreview {
    /// The threshold the preview was computed with.
    pub older_than_days: i64,
    /// The cutoff derived from the threshold.
    pub cutoff: DateTime<Utc>,
    /// Every entry that an execute run would delete.
    pub logs: Vec<ActivityLogEntry>,
}

/// Result of a destructive cleanup run.
#[derive(Debug, Clone)]
pub struct CleanupOutcome {
    /// The threshold the run was executed with.
    pub older_than_days: i64,
    /// The cutoff derived from the threshold.
    pub cutoff: DateTime<Utc>,
    /// Number of entries removed.
    pub deleted_count: u64,
}

/// Application service for the administrative activity log.
#[derive(Clone)]
pub struct ActivityLogService {
    logs: Arc<dyn ActivityLogRepository>,
}

impl ActivityLogService {
    /// Creates a new activity-log service.
    #[must_use]
    pub fn new(logs: Arc<dyn ActivityLogRepository>) -> Self {
        Self { logs }
    }

    /// Returns one page of entries matching the query, newest first.
    pub async fn list(&self, query: ActivityLogQuery) -> AppResult<ActivityLogPage> {
        let page = query.page.max(1);
        let limit = query.limit.max(1);

        let total = self.logs.count(&query.filter).await?;
        let offset = u64::from(page - 1) * u64::from(limit);
        let logs = self
            .logs
            .list(&query.filter, u64::from(limit), offset)
            .await?;

        let pages = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);

        Ok(ActivityLogPage {
            total,
            page,
            pages,
            logs,
        })
    }

    /// Deletes one entry.
    pub async fn remove(&self, id: ActivityLogId) -> AppResult<()> {
        if !self.logs.delete(id).await? {
            return Err(AppError::NotFound("activity log not found".to_owned()));
        }
        Ok(())
    }

    /// Read-only cleanup preview under the strict policy. Returns the full
    /// matched set so callers can render it.
    pub async fn preview_cleanup(
        &self,
        now: DateTime<Utc>,
        older_than: Option<i64>,
    ) -> AppResult<CleanupPreview> {
        let policy = RetentionPolicy::Strict;
        let days = policy.resolve_days(older_than)?;
        let cutoff = compute_cutoff(now, days)?;

        let logs = self
            .logs
            .list_older_than(cutoff, policy.inclusive_cutoff())
            .await?;

        Ok(CleanupPreview {
            older_than_days: days,
            cutoff,
            logs,
        })
    }

    /// Destructive cleanup under the given policy. Re-running against an
    /// already-clean store deletes zero entries.
    pub async fn execute_cleanup(
        &self,
        policy: RetentionPolicy,
        now: DateTime<Utc>,
        older_than: Option<i64>,
    ) -> AppResult<CleanupOutcome> {
        let days = policy.resolve_days(older_than)?;
        let cutoff = compute_cutoff(now, days)?;

        let deleted_count = self
            .logs
            .delete_older_than(cutoff, policy.inclusive_cutoff())
            .await?;

        Ok(CleanupOutcome {
            older_than_days: days,
            cutoff,
            deleted_count,
        })
    }

    /// Renders every entry matching `filter` as CSV.
    pub async fn export_csv(&self, filter: &ActivityLogFilter) -> AppResult<String> {
        let entries = self.logs.list_matching(filter).await?;
        if entries.is_empty() {
            return Err(AppError::NotFound("no logs found for export".to_owned()));
        }

        let mut lines = Vec::with_capacity(entries.len() + 1);
        lines.push(CSV_HEADER.to_owned());
        for entry in &entries {
            lines.push(csv_row(entry));
        }

        Ok(lines.join("\n"))
    }
}

fn csv_row(entry: &ActivityLogEntry) -> String {
    let user_name = entry.user.as_ref().map(|user| user.name.as_str()).unwrap_or_default();
    let user_email = entry
        .user
        .as_ref()
        .map(|user| user.email.as_str())
        .unwrap_or_default();
    let product_name = entry
        .product
        .as_ref()
        .map(|product| product.name.as_str())
        .unwrap_or_default();
    let product_id = entry
        .product_id
        .map(|id| id.to_string())
        .unwrap_or_default();

    [
        entry.action.as_str().to_owned(),
        csv_field(user_name),
        csv_field(user_email),
        csv_field(product_name),
        product_id,
        entry.created_at.to_rfc3339(),
    ]
    .join(",")
}

/// Quotes a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use cultiva_core::{AppError, AppResult, Role};
    use cultiva_domain::{
        ActivityAction, ActivityLogId, ProductId, RecordRef, RetentionPolicy, UserId, classify,
        compute_cutoff,
    };
    use tokio::sync::Mutex;

    use super::ActivityLogService;
    use crate::{
        ActivityLogEntry, ActivityLogFilter, ActivityLogQuery, ActivityLogRepository,
        ActorSummary,
    };

    struct FakeActivityLogRepository {
        entries: Mutex<Vec<ActivityLogEntry>>,
    }

    impl FakeActivityLogRepository {
        fn new() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
            }
        }

        async fn seed(&self, entry: ActivityLogEntry) {
            self.entries.lock().await.push(entry);
        }

        fn matches(entry: &ActivityLogEntry, filter: &ActivityLogFilter) -> bool {
            filter
                .action
                .as_deref()
                .is_none_or(|action| entry.action.as_str() == action)
                && filter.user_id.is_none_or(|user_id| entry.user_id == user_id)
                && filter
                    .product_id
                    .is_none_or(|product_id| entry.product_id == Some(product_id))
                && filter.from.is_none_or(|from| entry.created_at >= from)
                && filter.to.is_none_or(|to| entry.created_at <= to)
        }
    }

    #[async_trait]
    impl ActivityLogRepository for FakeActivityLogRepository {
        async fn count(&self, filter: &ActivityLogFilter) -> AppResult<u64> {
            Ok(self
                .entries
                .lock()
                .await
                .iter()
                .filter(|entry| Self::matches(entry, filter))
                .count() as u64)
        }

        async fn list(
            &self,
            filter: &ActivityLogFilter,
            limit: u64,
            offset: u64,
        ) -> AppResult<Vec<ActivityLogEntry>> {
            let mut matched: Vec<ActivityLogEntry> = self
                .entries
                .lock()
                .await
                .iter()
                .filter(|entry| Self::matches(entry, filter))
                .cloned()
                .collect();
            matched.sort_by(|left, right| right.created_at.cmp(&left.created_at));
            Ok(matched
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect())
        }

        async fn list_matching(
            &self,
            filter: &ActivityLogFilter,
        ) -> AppResult<Vec<ActivityLogEntry>> {
            self.list(filter, u64::MAX, 0).await
        }

        async fn delete(&self, id: ActivityLogId) -> AppResult<bool> {
            let mut entries = self.entries.lock().await;
            let before = entries.len();
            entries.retain(|entry| entry.id != id);
            Ok(entries.len() < before)
        }

        async fn list_older_than(
            &self,
            cutoff: DateTime<Utc>,
            inclusive: bool,
        ) -> AppResult<Vec<ActivityLogEntry>> {
            let entries = self.entries.lock().await;
            let refs: Vec<RecordRef> = entries
                .iter()
                .map(|entry| RecordRef {
                    id: entry.id.as_uuid(),
                    created_at: entry.created_at,
                })
                .collect();
            let classification = classify(&refs, cutoff, inclusive);
            Ok(entries
                .iter()
                .filter(|entry| classification.to_delete.contains(&entry.id.as_uuid()))
                .cloned()
                .collect())
        }

        async fn delete_older_than(
            &self,
            cutoff: DateTime<Utc>,
            inclusive: bool,
        ) -> AppResult<u64> {
            let mut entries = self.entries.lock().await;
            let refs: Vec<RecordRef> = entries
                .iter()
                .map(|entry| RecordRef {
                    id: entry.id.as_uuid(),
                    created_at: entry.created_at,
                })
                .collect();
            let classification = classify(&refs, cutoff, inclusive);
            entries.retain(|entry| !classification.to_delete.contains(&entry.id.as_uuid()));
            Ok(classification.count as u64)
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().map_or_else(
            || panic!("invalid test timestamp"),
            |value| value,
        )
    }

    fn entry(age_days: i64) -> ActivityLogEntry {
        entry_at(now() - Duration::days(age_days))
    }

    fn entry_at(created_at: DateTime<Utc>) -> ActivityLogEntry {
        ActivityLogEntry {
            id: ActivityLogId::new(),
            action: ActivityAction::UpdateProduct,
            user_id: UserId::new(),
            product_id: Some(ProductId::new()),
            user: Some(ActorSummary {
                name: "Ada".to_owned(),
                email: "ada@example.com".to_owned(),
                role: Role::Admin,
            }),
            product: None,
            changes: None,
            created_at,
        }
    }

    fn service() -> (ActivityLogService, Arc<FakeActivityLogRepository>) {
        let repository = Arc::new(FakeActivityLogRepository::new());
        (ActivityLogService::new(repository.clone()), repository)
    }

    #[tokio::test]
    async fn preview_defaults_to_180_days_and_returns_the_matched_set() -> AppResult<()> {
        let (service, repository) = service();
        let old = entry(200);
        let old_id = old.id;
        repository.seed(old).await;
        repository.seed(entry(100)).await;

        let preview = service.preview_cleanup(now(), None).await?;
        assert_eq!(preview.older_than_days, 180);
        assert_eq!(preview.logs.len(), 1);
        assert_eq!(preview.logs[0].id, old_id);

        // The preview must not mutate the store.
        assert_eq!(repository.entries.lock().await.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn strict_thresholds_below_seven_days_are_rejected() {
        let (service, _) = service();
        for invalid in [6, 0, -5] {
            let result = service.preview_cleanup(now(), Some(invalid)).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn legacy_thresholds_must_be_positive() {
        let (service, _) = service();
        for invalid in [0, -5] {
            let result = service
                .execute_cleanup(RetentionPolicy::Legacy, now(), Some(invalid))
                .await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn strict_execute_deletes_the_boundary_record_and_legacy_keeps_it() -> AppResult<()> {
        let cutoff = compute_cutoff(now(), 30)?;

        let (strict_service, strict_repository) = service();
        strict_repository.seed(entry_at(cutoff)).await;
        let strict = strict_service
            .execute_cleanup(RetentionPolicy::Strict, now(), Some(30))
            .await?;
        assert_eq!(strict.deleted_count, 1);

        let (legacy_service, legacy_repository) = service();
        legacy_repository.seed(entry_at(cutoff)).await;
        let legacy = legacy_service
            .execute_cleanup(RetentionPolicy::Legacy, now(), Some(30))
            .await?;
        assert_eq!(legacy.deleted_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn executing_twice_deletes_nothing_the_second_time() -> AppResult<()> {
        let (service, repository) = service();
        repository.seed(entry(400)).await;
        repository.seed(entry(300)).await;
        repository.seed(entry(10)).await;

        let first = service
            .execute_cleanup(RetentionPolicy::Strict, now(), None)
            .await?;
        assert_eq!(first.deleted_count, 2);

        let second = service
            .execute_cleanup(RetentionPolicy::Strict, now(), None)
            .await?;
        assert_eq!(second.deleted_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn legacy_default_is_30_days() -> AppResult<()> {
        let (service, repository) = service();
        repository.seed(entry(31)).await;
        repository.seed(entry(29)).await;

        let outcome = service
            .execute_cleanup(RetentionPolicy::Legacy, now(), None)
            .await?;
        assert_eq!(outcome.older_than_days, 30);
        assert_eq!(outcome.deleted_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn removing_a_missing_entry_is_not_found() {
        let (service, _) = service();
        let result = service.remove(ActivityLogId::new()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn listing_paginates_newest_first() -> AppResult<()> {
        let (service, repository) = service();
        for age in [1, 2, 3, 4, 5] {
            repository.seed(entry(age)).await;
        }

        let page = service
            .list(ActivityLogQuery {
                filter: ActivityLogFilter::default(),
                page: 1,
                limit: 2,
            })
            .await?;

        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 3);
        assert_eq!(page.logs.len(), 2);
        assert!(page.logs[0].created_at > page.logs[1].created_at);
        Ok(())
    }

    #[tokio::test]
    async fn csv_export_quotes_fields_containing_delimiters() -> AppResult<()> {
        let (service, repository) = service();
        let mut sample = entry(1);
        sample.user = Some(ActorSummary {
            name: "Rossi, Mario".to_owned(),
            email: "mario@example.com".to_owned(),
            role: Role::Admin,
        });
        repository.seed(sample).await;

        let csv = service.export_csv(&ActivityLogFilter::default()).await?;
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Action,User Name,User Email,Product Name,Product ID,Date")
        );
        let row = lines
            .next()
            .ok_or_else(|| AppError::Internal("missing csv row".to_owned()))?;
        assert!(row.starts_with("UPDATE_PRODUCT,\"Rossi, Mario\","));
        Ok(())
    }

    #[tokio::test]
    async fn csv_export_with_no_rows_is_not_found() {
        let (service, _) = service();
        let result = service.export_csv(&ActivityLogFilter::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
