use chrono::{DateTime, Utc};
use cultiva_application::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogPage, ActorSummary, CleanupOutcome,
    CleanupPreview, ProductSummary,
};
use cultiva_core::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Query parameters for activity-log listing and CSV export.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub action: Option<String>,
    pub user_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ActivityLogParams {
    /// Converts the query parameters into a repository filter.
    pub fn to_filter(&self) -> ActivityLogFilter {
        ActivityLogFilter {
            action: self.action.clone(),
            user_id: self.user_id.map(cultiva_domain::UserId::from_uuid),
            product_id: self.product_id.map(cultiva_domain::ProductId::from_uuid),
            from: self.from,
            to: self.to,
        }
    }
}

/// Acting-user details on a rendered log entry.
#[derive(Debug, Serialize)]
pub struct ActorResponse {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<ActorSummary> for ActorResponse {
    fn from(actor: ActorSummary) -> Self {
        Self {
            name: actor.name,
            email: actor.email,
            role: actor.role,
        }
    }
}

/// Product details on a rendered log entry.
#[derive(Debug, Serialize)]
pub struct ProductRefResponse {
    pub name: String,
    pub image: String,
}

impl From<ProductSummary> for ProductRefResponse {
    fn from(product: ProductSummary) -> Self {
        Self {
            name: product.name,
            image: product.image,
        }
    }
}

/// One rendered activity-log entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryResponse {
    pub id: Uuid,
    pub action: String,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ActorResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductRefResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityLogEntry> for LogEntryResponse {
    fn from(entry: ActivityLogEntry) -> Self {
        Self {
            id: entry.id.as_uuid(),
            action: entry.action.as_str().to_owned(),
            user_id: entry.user_id.as_uuid(),
            product_id: entry.product_id.map(|id| id.as_uuid()),
            user: entry.user.map(ActorResponse::from),
            product: entry.product.map(ProductRefResponse::from),
            changes: entry.changes,
            created_at: entry.created_at,
        }
    }
}

/// One page of activity-log entries.
#[derive(Debug, Serialize)]
pub struct ActivityLogListResponse {
    pub total: u64,
    pub page: u32,
    pub pages: u32,
    pub logs: Vec<LogEntryResponse>,
}

impl From<ActivityLogPage> for ActivityLogListResponse {
    fn from(page: ActivityLogPage) -> Self {
        Self {
            total: page.total,
            page: page.page,
            pages: page.pages,
            logs: page.logs.into_iter().map(LogEntryResponse::from).collect(),
        }
    }
}

/// Query parameters for the cleanup endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupParams {
    pub older_than: Option<i64>,
}

/// Response for a cleanup dry run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupPreviewResponse {
    pub mode: &'static str,
    pub older_than_days: i64,
    pub cutoff_date: DateTime<Utc>,
    pub total_to_delete: usize,
    pub logs: Vec<LogEntryResponse>,
}

impl From<CleanupPreview> for CleanupPreviewResponse {
    fn from(preview: CleanupPreview) -> Self {
        Self {
            mode: "dryRun",
            older_than_days: preview.older_than_days,
            cutoff_date: preview.cutoff,
            total_to_delete: preview.logs.len(),
            logs: preview.logs.into_iter().map(LogEntryResponse::from).collect(),
        }
    }
}

/// Response for an executed cleanup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupExecuteResponse {
    pub mode: &'static str,
    pub older_than_days: i64,
    pub cutoff_date: DateTime<Utc>,
    pub deleted_count: u64,
    pub message: String,
}

impl From<CleanupOutcome> for CleanupExecuteResponse {
    fn from(outcome: CleanupOutcome) -> Self {
        Self {
            mode: "execute",
            older_than_days: outcome.older_than_days,
            cutoff_date: outcome.cutoff,
            deleted_count: outcome.deleted_count,
            message: format!(
                "Successfully deleted {} logs older than {} days.",
                outcome.deleted_count, outcome.older_than_days
            ),
        }
    }
}
