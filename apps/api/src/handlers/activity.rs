use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use cultiva_application::ActivityLogQuery;
use cultiva_domain::{ActivityLogId, RetentionPolicy};
use uuid::Uuid;

use crate::dto::{
    ActivityLogListResponse, ActivityLogParams, CleanupExecuteResponse, CleanupParams,
    CleanupPreviewResponse, GenericMessageResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_activity_logs_handler(
    State(state): State<AppState>,
    Query(params): Query<ActivityLogParams>,
) -> ApiResult<Json<ActivityLogListResponse>> {
    let page = state
        .activity_log_service
        .list(ActivityLogQuery {
            filter: params.to_filter(),
            page: params.page.unwrap_or(1),
            limit: params.limit.unwrap_or(20),
        })
        .await?;

    Ok(Json(page.into()))
}

pub async fn remove_activity_log_handler(
    State(state): State<AppState>,
    Path(log_id): Path<Uuid>,
) -> ApiResult<Json<GenericMessageResponse>> {
    state
        .activity_log_service
        .remove(ActivityLogId::from_uuid(log_id))
        .await?;

    Ok(Json(GenericMessageResponse {
        message: "Activity log successfully deleted".to_owned(),
    }))
}

/// GET /api/activity-logs/cleanup/preview - Strict-policy dry run.
pub async fn cleanup_preview_handler(
    State(state): State<AppState>,
    Query(params): Query<CleanupParams>,
) -> ApiResult<Json<CleanupPreviewResponse>> {
    let preview = state
        .activity_log_service
        .preview_cleanup(Utc::now(), params.older_than)
        .await?;

    Ok(Json(preview.into()))
}

/// DELETE /api/activity-logs/cleanup - Strict-policy execute.
pub async fn cleanup_execute_handler(
    State(state): State<AppState>,
    Query(params): Query<CleanupParams>,
) -> ApiResult<Json<CleanupExecuteResponse>> {
    let outcome = state
        .activity_log_service
        .execute_cleanup(RetentionPolicy::Strict, Utc::now(), params.older_than)
        .await?;

    Ok(Json(outcome.into()))
}

/// DELETE /api/activity-logs/cleanup/legacy - Legacy-policy execute.
///
/// Kept as its own operation: the legacy tool accepts any positive
/// threshold, defaults to 30 days, and excludes the boundary instant.
pub async fn cleanup_legacy_handler(
    State(state): State<AppState>,
    Query(params): Query<CleanupParams>,
) -> ApiResult<Json<CleanupExecuteResponse>> {
    let outcome = state
        .activity_log_service
        .execute_cleanup(RetentionPolicy::Legacy, Utc::now(), params.older_than)
        .await?;

    Ok(Json(outcome.into()))
}

pub async fn export_activity_logs_csv_handler(
    State(state): State<AppState>,
    Query(params): Query<ActivityLogParams>,
) -> ApiResult<Response> {
    let csv = state
        .activity_log_service
        .export_csv(&params.to_filter())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=activity-logs.csv",
            ),
        ],
        csv,
    )
        .into_response())
}
