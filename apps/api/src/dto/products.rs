use chrono::{DateTime, Utc};
use cultiva_application::{ProductFilter, ProductSort};
use cultiva_core::AppResult;
use cultiva_domain::{Category, DosageLine, PackagingOption, Product, ProductDraft, ProductPatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload for creating a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub image: String,
    pub composition: String,
    pub characteristics: String,
    pub category: String,
    #[serde(default)]
    pub dosage: Vec<DosageLine>,
    #[serde(default)]
    pub packaging: Vec<PackagingOption>,
}

impl CreateProductRequest {
    /// Converts the payload into a domain draft, resolving the category.
    pub fn into_draft(self) -> AppResult<ProductDraft> {
        Ok(ProductDraft {
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            image: self.image,
            composition: self.composition,
            characteristics: self.characteristics,
            category: Category::parse(&self.category)?,
            dosage: self.dosage,
            packaging: self.packaging,
        })
    }
}

/// Payload for a partial product update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub image: Option<String>,
    pub composition: Option<String>,
    pub characteristics: Option<String>,
    pub category: Option<String>,
    pub dosage: Option<Vec<DosageLine>>,
    pub packaging: Option<Vec<PackagingOption>>,
}

impl UpdateProductRequest {
    /// Converts the payload into a domain patch, resolving the category.
    pub fn into_patch(self) -> AppResult<ProductPatch> {
        Ok(ProductPatch {
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            image: self.image,
            composition: self.composition,
            characteristics: self.characteristics,
            category: self.category.as_deref().map(Category::parse).transpose()?,
            dosage: self.dosage,
            packaging: self.packaging,
        })
    }
}

/// API representation of a product.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub image: String,
    pub composition: String,
    pub characteristics: String,
    pub category: Category,
    pub dosage: Vec<DosageLine>,
    pub packaging: Vec<PackagingOption>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_uuid(),
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            image: product.image,
            composition: product.composition,
            characteristics: product.characteristics,
            category: product.category,
            dosage: product.dosage,
            packaging: product.packaging,
            published: product.published,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Product list with its size.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub count: usize,
    pub products: Vec<ProductResponse>,
}

/// Response for mutations that return the affected product.
#[derive(Debug, Serialize)]
pub struct ProductMutationResponse {
    pub message: String,
    pub product: ProductResponse,
}

/// Page query parameters for the paginated catalog listing.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// One page of products.
#[derive(Debug, Serialize)]
pub struct PaginatedProductsResponse {
    pub total: u64,
    pub page: u32,
    pub pages: u32,
    pub amount: usize,
    pub products: Vec<ProductResponse>,
}

/// Catalog filter query parameters, echoed back in the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilterParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cultivation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl ProductFilterParams {
    /// Converts the query parameters into a repository filter.
    pub fn to_filter(&self) -> AppResult<ProductFilter> {
        let sort = match self.sort.as_deref() {
            Some(raw) => ProductSort::parse(raw)?,
            None => ProductSort::default(),
        };

        Ok(ProductFilter {
            name: self.name.clone(),
            category: self.category.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            cultivation: self.cultivation.clone(),
            package_type: self.package_type.clone(),
            sort,
        })
    }
}

/// Filtered catalog listing, echoing the filters that produced it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredProductsResponse {
    pub filters_used: ProductFilterParams,
    pub total: usize,
    pub products: Vec<ProductResponse>,
}
