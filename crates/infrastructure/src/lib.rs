//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod cloudinary_media_storage;
mod jwt_token_issuer;
mod postgres_activity_log_repository;
mod postgres_product_repository;
mod postgres_user_repository;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use cloudinary_media_storage::{CloudinaryConfig, CloudinaryMediaStorage};
pub use jwt_token_issuer::JwtTokenIssuer;
pub use postgres_activity_log_repository::PostgresActivityLogRepository;
pub use postgres_product_repository::PostgresProductRepository;
pub use postgres_user_repository::PostgresUserRepository;
