//! Request and response payloads for the HTTP API.

mod activity;
mod common;
mod products;
mod users;

pub use activity::{
    ActivityLogListResponse, ActivityLogParams, ActorResponse, CleanupExecuteResponse,
    CleanupParams, CleanupPreviewResponse, LogEntryResponse, ProductRefResponse,
};
pub use common::GenericMessageResponse;
pub use products::{
    CreateProductRequest, FilteredProductsResponse, PaginatedProductsResponse, PaginationParams,
    ProductFilterParams, ProductListResponse, ProductMutationResponse, ProductResponse,
    UpdateProductRequest,
};
pub use users::{
    CreateUserRequest, CreateUserResponse, ListUsersResponse, LoginRequest, LoginResponse,
    UserResponse,
};
