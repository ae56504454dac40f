//! Cultiva API composition root.

#![forbid(unsafe_code)]

mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post};
use cultiva_application::{
    ActivityLogService, MediaStorage, ProductService, TokenIssuer, UserService,
};
use cultiva_core::AppError;
use cultiva_infrastructure::{
    Argon2PasswordHasher, CloudinaryConfig, CloudinaryMediaStorage, JwtTokenIssuer,
    PostgresActivityLogRepository, PostgresProductRepository, PostgresUserRepository,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

/// Upper bound for multipart upload bodies.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let token_secret = required_env("AUTH_TOKEN_SECRET")?;
    let token_ttl_seconds = parse_env_i64("AUTH_TOKEN_TTL_SECONDS", 86_400)?;

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(4154);

    let cloudinary_config = CloudinaryConfig {
        cloud_name: required_env("CLOUDINARY_CLOUD_NAME")?,
        api_key: required_env("CLOUDINARY_API_KEY")?,
        api_secret: required_env("CLOUDINARY_API_SECRET")?,
        folder: env::var("CLOUDINARY_FOLDER").unwrap_or_else(|_| "cultiva".to_owned()),
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let product_repository = Arc::new(PostgresProductRepository::new(pool.clone()));
    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let activity_log_repository = Arc::new(PostgresActivityLogRepository::new(pool.clone()));

    let password_hasher = Arc::new(Argon2PasswordHasher::new());
    let token_issuer: Arc<dyn TokenIssuer> =
        Arc::new(JwtTokenIssuer::new(&token_secret, token_ttl_seconds)?);
    let media_storage: Arc<dyn MediaStorage> =
        Arc::new(CloudinaryMediaStorage::new(cloudinary_config)?);

    let app_state = AppState {
        product_service: ProductService::new(
            product_repository,
            activity_log_repository.clone(),
        ),
        user_service: UserService::new(user_repository, password_hasher, token_issuer.clone()),
        activity_log_service: ActivityLogService::new(activity_log_repository),
        media_storage,
        token_issuer,
    };

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/api/auth/login", post(handlers::auth::login_handler))
        .route("/api/users/create", post(handlers::users::create_user_handler))
        .route(
            "/api/products/list",
            get(handlers::products::list_products_handler),
        )
        .route(
            "/api/products/published",
            get(handlers::products::published_products_handler),
        )
        .route(
            "/api/products/details/{product_id}",
            get(handlers::products::product_details_handler),
        )
        .route(
            "/api/products/paginated",
            get(handlers::products::paginated_products_handler),
        )
        .route(
            "/api/products/filter",
            get(handlers::products::filter_products_handler),
        );

    let admin_routes = Router::new()
        .route(
            "/api/products/create",
            post(handlers::products::create_product_handler),
        )
        .route(
            "/api/products/update/{product_id}",
            patch(handlers::products::update_product_handler),
        )
        .route(
            "/api/products/delete/{product_id}",
            delete(handlers::products::delete_product_handler),
        )
        .route(
            "/api/products/publish/{product_id}",
            patch(handlers::products::publish_product_handler),
        )
        .route(
            "/api/products/unpublish/{product_id}",
            patch(handlers::products::unpublish_product_handler),
        )
        .route(
            "/api/products/duplicate/{product_id}",
            post(handlers::products::duplicate_product_handler),
        )
        .route(
            "/api/products/upload-image",
            post(handlers::uploads::upload_product_image_handler),
        )
        .route(
            "/api/products/upload-images",
            post(handlers::uploads::upload_product_images_handler),
        )
        .route("/api/users/list", get(handlers::users::list_users_handler))
        .route(
            "/api/activity-logs/logs",
            get(handlers::activity::list_activity_logs_handler),
        )
        .route(
            "/api/activity-logs/export/csv",
            get(handlers::activity::export_activity_logs_csv_handler),
        )
        .route(
            "/api/activity-logs/remove/{log_id}",
            delete(handlers::activity::remove_activity_log_handler),
        )
        .route(
            "/api/activity-logs/cleanup/preview",
            get(handlers::activity::cleanup_preview_handler),
        )
        .route(
            "/api/activity-logs/cleanup",
            delete(handlers::activity::cleanup_execute_handler),
        )
        .route(
            "/api/activity-logs/cleanup/legacy",
            delete(handlers::activity::cleanup_legacy_handler),
        )
        // Layer order matters: authentication must run before the role check.
        .route_layer(from_fn(middleware::require_admin))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let app = public_routes
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer()?)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "cultiva-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

/// Restricts CORS to FRONTEND_URL when set; otherwise the API is open, the
/// way the public catalog endpoints are consumed.
fn cors_layer() -> Result<CorsLayer, AppError> {
    match env::var("FRONTEND_URL") {
        Ok(frontend_url) => {
            let origin = HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;
            Ok(CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any))
        }
        Err(_) => Ok(CorsLayer::permissive()),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_i64(name: &str, default: i64) -> Result<i64, AppError> {
    match env::var(name) {
        Ok(value) => value.parse::<i64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
