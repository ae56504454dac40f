//! Application services and ports for the Cultiva catalog backend.

#![forbid(unsafe_code)]

mod activity_ports;
mod activity_service;
mod media_ports;
mod product_ports;
mod product_service;
mod user_ports;
mod user_service;

pub use activity_ports::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogPage, ActivityLogQuery,
    ActivityLogRepository, ActivityRecorder, ActorSummary, NewActivityLog, ProductSummary,
};
pub use activity_service::{ActivityLogService, CleanupOutcome, CleanupPreview};
pub use media_ports::{MAX_UPLOAD_FILES, MediaStorage, MediaUpload, StoredMedia, is_supported_media_type};
pub use product_ports::{ProductFilter, ProductPage, ProductRepository, ProductSort, ProductSortKey};
pub use product_service::ProductService;
pub use user_ports::{NewUser, PasswordHasher, TokenIssuer, UserRecord, UserRepository};
pub use user_service::{LoginSuccess, RegisterParams, UserProfile, UserService};
