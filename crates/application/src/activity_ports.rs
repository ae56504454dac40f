//! Write and read ports for the administrative activity log.
//!
//! Recording and querying are separate ports: catalog services only append,
//! the activity-log service reads, deletes, and applies retention.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cultiva_core::{AppResult, Role};
use cultiva_domain::{ActivityAction, ActivityLogId, ProductId, UserId};
use serde_json::Value;

/// A new activity-log entry to append.
#[derive(Debug, Clone)]
pub struct NewActivityLog {
    /// The administrative action performed.
    pub action: ActivityAction,
    /// Product the action applied to, when there is one.
    pub product_id: Option<ProductId>,
    /// User who performed the action.
    pub user_id: UserId,
    /// Action-specific change payload.
    pub changes: Option<Value>,
}

/// Write port used by catalog services to append audit entries.
#[async_trait]
pub trait ActivityRecorder: Send + Sync {
    /// Appends one entry to the activity log.
    async fn record(&self, entry: NewActivityLog) -> AppResult<()>;
}

/// Acting-user details resolved for log rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorSummary {
    /// Display name of the acting user.
    pub name: String,
    /// Email of the acting user.
    pub email: String,
    /// Role of the acting user.
    pub role: Role,
}

/// Product details resolved for log rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSummary {
    /// Display name of the product.
    pub name: String,
    /// Main image URL of the product.
    pub image: String,
}

/// A stored activity-log entry with best-effort resolved references.
///
/// `user` and `product` are `None` when the referenced record no longer
/// exists; the raw identifiers are always kept.
#[derive(Debug, Clone)]
pub struct ActivityLogEntry {
    /// Unique entry identifier.
    pub id: ActivityLogId,
    /// The recorded action.
    pub action: ActivityAction,
    /// Identifier of the acting user.
    pub user_id: UserId,
    /// Identifier of the affected product, when there was one.
    pub product_id: Option<ProductId>,
    /// Resolved acting-user details, when still present.
    pub user: Option<ActorSummary>,
    /// Resolved product details, when still present.
    pub product: Option<ProductSummary>,
    /// Action-specific change payload.
    pub changes: Option<Value>,
    /// When the action was recorded.
    pub created_at: DateTime<Utc>,
}

/// Filter over the activity log, shared by listing and CSV export.
#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    /// Restrict to one action, matched as raw text against the storage
    /// string. An unknown action matches nothing rather than failing.
    pub action: Option<String>,
    /// Restrict to one acting user.
    pub user_id: Option<UserId>,
    /// Restrict to one product.
    pub product_id: Option<ProductId>,
    /// Lower creation-time bound, inclusive.
    pub from: Option<DateTime<Utc>>,
    /// Upper creation-time bound, inclusive.
    pub to: Option<DateTime<Utc>>,
}

/// A paginated activity-log query.
#[derive(Debug, Clone, Default)]
pub struct ActivityLogQuery {
    /// Entry filter.
    pub filter: ActivityLogFilter,
    /// Requested page, 1-based.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

/// One page of activity-log entries, newest first.
#[derive(Debug, Clone)]
pub struct ActivityLogPage {
    /// Total number of entries matching the filter.
    pub total: u64,
    /// The page that was requested.
    pub page: u32,
    /// Total number of pages at the requested page size.
    pub pages: u32,
    /// The entries on this page.
    pub logs: Vec<ActivityLogEntry>,
}

/// Read/cleanup port for the activity log.
///
/// `list_older_than` and `delete_older_than` must apply the same cutoff
/// comparison for a given `inclusive` flag so that preview and execute can
/// never drift apart.
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Counts entries matching `filter`.
    async fn count(&self, filter: &ActivityLogFilter) -> AppResult<u64>;

    /// Returns one page of entries matching `filter`, newest first.
    async fn list(
        &self,
        filter: &ActivityLogFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ActivityLogEntry>>;

    /// Returns every entry matching `filter`, newest first. Used by export.
    async fn list_matching(&self, filter: &ActivityLogFilter) -> AppResult<Vec<ActivityLogEntry>>;

    /// Deletes one entry, returning whether it existed.
    async fn delete(&self, id: ActivityLogId) -> AppResult<bool>;

    /// Returns every entry created at (`inclusive`) or strictly before the
    /// cutoff, newest first.
    async fn list_older_than(
        &self,
        cutoff: DateTime<Utc>,
        inclusive: bool,
    ) -> AppResult<Vec<ActivityLogEntry>>;

    /// Deletes every entry created at (`inclusive`) or strictly before the
    /// cutoff, returning the number of rows removed.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>, inclusive: bool) -> AppResult<u64>;
}
