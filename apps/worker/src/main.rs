//! Cultiva activity-log retention worker.
//!
//! Runs the strict retention cleanup on the first day of every month at
//! 02:00 UTC: a dry-run count first, then the destructive pass when
//! anything qualifies. Failures are reported, never retried. `cultiva-worker
//! once` runs a single pass immediately and exits.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use cultiva_application::ActivityLogService;
use cultiva_core::{AppError, AppResult};
use cultiva_domain::RetentionPolicy;
use cultiva_infrastructure::PostgresActivityLogRepository;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Hour of day (UTC) the monthly cleanup fires at.
const RUN_HOUR: u32 = 2;

#[derive(Debug, Clone)]
struct CleanupConfig {
    database_url: String,
    enabled: bool,
    retention_days: i64,
}

impl CleanupConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let enabled = env::var("CLEANUP_CRON_ENABLED")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let retention_days = parse_env_i64("LOG_RETENTION_DAYS", 180)?;

        // Fail at startup rather than on the first firing.
        RetentionPolicy::Strict.resolve_days(Some(retention_days))?;

        Ok(Self {
            database_url,
            enabled,
            retention_days,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let run_once = env::args().nth(1).as_deref() == Some("once");
    let config = CleanupConfig::load()?;

    if !config.enabled && !run_once {
        info!("retention cleanup disabled (CLEANUP_CRON_ENABLED != true)");
        return Ok(());
    }

    let pool = connect_pool(config.database_url.as_str()).await?;
    let service = build_activity_log_service(pool);

    if run_once {
        return run_cleanup(&service, config.retention_days).await;
    }

    info!(
        retention_days = config.retention_days,
        "retention cleanup scheduled monthly"
    );

    loop {
        let now = Utc::now();
        let next_run = next_monthly_run(now);
        info!(next_run = %next_run, "waiting for next retention cleanup");

        let wait = (next_run - now).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        if let Err(error) = run_cleanup(&service, config.retention_days).await {
            warn!(error = %error, "retention cleanup failed");
        }
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_activity_log_service(pool: PgPool) -> ActivityLogService {
    ActivityLogService::new(Arc::new(PostgresActivityLogRepository::new(pool)))
}

/// One cleanup pass: dry-run count, then execute when anything qualifies.
async fn run_cleanup(service: &ActivityLogService, retention_days: i64) -> AppResult<()> {
    let now = Utc::now();

    let preview = service.preview_cleanup(now, Some(retention_days)).await?;
    info!(
        eligible = preview.logs.len(),
        retention_days,
        cutoff = %preview.cutoff,
        "retention dry run"
    );

    if preview.logs.is_empty() {
        info!("no activity logs past retention");
        return Ok(());
    }

    let outcome = service
        .execute_cleanup(RetentionPolicy::Strict, now, Some(retention_days))
        .await?;
    info!(
        deleted = outcome.deleted_count,
        cutoff = %outcome.cutoff,
        "retention cleanup executed"
    );

    Ok(())
}

/// Returns the next first-of-month 02:00 UTC instant strictly after `after`.
fn next_monthly_run(after: DateTime<Utc>) -> DateTime<Utc> {
    let this_month = Utc.with_ymd_and_hms(after.year(), after.month(), 1, RUN_HOUR, 0, 0);
    if let Some(candidate) = this_month.single()
        && candidate > after
    {
        return candidate;
    }

    let (year, month) = if after.month() == 12 {
        (after.year() + 1, 1)
    } else {
        (after.year(), after.month() + 1)
    };

    Utc.with_ymd_and_hms(year, month, 1, RUN_HOUR, 0, 0)
        .single()
        .unwrap_or_else(|| after + chrono::Duration::days(31))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_i64(name: &str, default: i64) -> AppResult<i64> {
    match env::var(name) {
        Ok(value) => value.parse::<i64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
