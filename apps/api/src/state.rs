use std::sync::Arc;

use cultiva_application::{
    ActivityLogService, MediaStorage, ProductService, TokenIssuer, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
    pub user_service: UserService,
    pub activity_log_service: ActivityLogService,
    pub media_storage: Arc<dyn MediaStorage>,
    pub token_issuer: Arc<dyn TokenIssuer>,
}
