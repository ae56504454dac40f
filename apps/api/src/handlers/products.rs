use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use cultiva_core::AuthClaims;
use cultiva_domain::ProductId;
use uuid::Uuid;

use crate::dto::{
    CreateProductRequest, FilteredProductsResponse, GenericMessageResponse,
    PaginatedProductsResponse, PaginationParams, ProductFilterParams, ProductListResponse,
    ProductMutationResponse, ProductResponse, UpdateProductRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_products_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<ProductListResponse>> {
    let products: Vec<ProductResponse> = state
        .product_service
        .list_products()
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(Json(ProductListResponse {
        count: products.len(),
        products,
    }))
}

pub async fn published_products_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<ProductListResponse>> {
    let products: Vec<ProductResponse> = state
        .product_service
        .published_products()
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(Json(ProductListResponse {
        count: products.len(),
        products,
    }))
}

pub async fn product_details_handler(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state
        .product_service
        .product_details(ProductId::from_uuid(product_id))
        .await?;

    Ok(Json(product.into()))
}

pub async fn paginated_products_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<PaginatedProductsResponse>> {
    let page = state
        .product_service
        .paginate(params.page.unwrap_or(1), params.limit.unwrap_or(10))
        .await?;

    let products: Vec<ProductResponse> =
        page.products.into_iter().map(ProductResponse::from).collect();

    Ok(Json(PaginatedProductsResponse {
        total: page.total,
        page: page.page,
        pages: page.pages,
        amount: products.len(),
        products,
    }))
}

pub async fn filter_products_handler(
    State(state): State<AppState>,
    Query(params): Query<ProductFilterParams>,
) -> ApiResult<Json<FilteredProductsResponse>> {
    let filter = params.to_filter()?;
    let products: Vec<ProductResponse> = state
        .product_service
        .filter_products(&filter)
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(Json(FilteredProductsResponse {
        filters_used: params,
        total: products.len(),
        products,
    }))
}

pub async fn create_product_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductMutationResponse>)> {
    let product = state
        .product_service
        .create_product(&claims, payload.into_draft()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductMutationResponse {
            message: "Product created successfully".to_owned(),
            product: product.into(),
        }),
    ))
}

pub async fn update_product_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> ApiResult<Json<ProductMutationResponse>> {
    let product = state
        .product_service
        .update_product(&claims, ProductId::from_uuid(product_id), payload.into_patch()?)
        .await?;

    Ok(Json(ProductMutationResponse {
        message: "Product updated successfully".to_owned(),
        product: product.into(),
    }))
}

pub async fn delete_product_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Json<GenericMessageResponse>> {
    state
        .product_service
        .delete_product(&claims, ProductId::from_uuid(product_id))
        .await?;

    Ok(Json(GenericMessageResponse {
        message: "Product deleted successfully".to_owned(),
    }))
}

pub async fn publish_product_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Json<ProductMutationResponse>> {
    let product = state
        .product_service
        .set_published(&claims, ProductId::from_uuid(product_id), true)
        .await?;

    Ok(Json(ProductMutationResponse {
        message: "Product published successfully".to_owned(),
        product: product.into(),
    }))
}

pub async fn unpublish_product_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Json<ProductMutationResponse>> {
    let product = state
        .product_service
        .set_published(&claims, ProductId::from_uuid(product_id), false)
        .await?;

    Ok(Json(ProductMutationResponse {
        message: "Product unpublished successfully".to_owned(),
        product: product.into(),
    }))
}

pub async fn duplicate_product_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<ProductMutationResponse>)> {
    let copy = state
        .product_service
        .duplicate_product(&claims, ProductId::from_uuid(product_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductMutationResponse {
            message: "Product duplicated successfully".to_owned(),
            product: copy.into(),
        }),
    ))
}
