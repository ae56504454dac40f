//! Repository port and query types for the product catalog.

use async_trait::async_trait;
use cultiva_core::{AppError, AppResult};
use cultiva_domain::{Product, ProductId};

/// Field the catalog can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortKey {
    /// Sort by display name.
    Name,
    /// Sort by unit price.
    Price,
    /// Sort by stock level.
    Stock,
    /// Sort by creation time.
    CreatedAt,
}

impl ProductSortKey {
    /// Parses a query-string sort key. Keys are whitelisted because they end
    /// up as SQL identifiers.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "stock" => Ok(Self::Stock),
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            _ => Err(AppError::Validation(format!(
                "sort must be one of: name / price / stock / createdAt, got '{value}'"
            ))),
        }
    }
}

/// Sort order for filtered catalog queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductSort {
    /// Field to sort by.
    pub key: ProductSortKey,
    /// True for descending order.
    pub descending: bool,
}

impl ProductSort {
    /// Parses the `sort=price` / `sort=-price` query convention: a leading
    /// dash selects descending order.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let (descending, key) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        Ok(Self {
            key: ProductSortKey::parse(key)?,
            descending,
        })
    }
}

impl Default for ProductSort {
    fn default() -> Self {
        Self {
            key: ProductSortKey::CreatedAt,
            descending: false,
        }
    }
}

/// Catalog filter. Category and packaging type are matched as opaque text:
/// an unknown value matches nothing rather than failing the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the display name.
    pub name: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Lower price bound, inclusive.
    pub min_price: Option<f64>,
    /// Upper price bound, inclusive.
    pub max_price: Option<f64>,
    /// Case-insensitive substring match on any dosage cultivation.
    pub cultivation: Option<String>,
    /// Exact match on any packaging option type.
    pub package_type: Option<String>,
    /// Sort order for the result set.
    pub sort: ProductSort,
}

/// One page of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    /// Total number of products in the catalog.
    pub total: u64,
    /// The page that was requested, 1-based.
    pub page: u32,
    /// Total number of pages at the requested page size.
    pub pages: u32,
    /// The products on this page.
    pub products: Vec<Product>,
}

/// Repository port for product persistence.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persists a new product.
    async fn insert(&self, product: &Product) -> AppResult<()>;

    /// Returns every product, oldest first.
    async fn list_all(&self) -> AppResult<Vec<Product>>;

    /// Returns every published product, oldest first.
    async fn list_published(&self) -> AppResult<Vec<Product>>;

    /// Finds a product by its identifier.
    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>>;

    /// Overwrites an existing product. Missing rows are not an error here;
    /// callers fetch first.
    async fn update(&self, product: &Product) -> AppResult<()>;

    /// Deletes a product, returning whether a row existed.
    async fn delete(&self, id: ProductId) -> AppResult<bool>;

    /// Returns the total number of products.
    async fn count(&self) -> AppResult<u64>;

    /// Returns one page of products, oldest first.
    async fn list_page(&self, limit: u64, offset: u64) -> AppResult<Vec<Product>>;

    /// Returns every product matching `filter`, in its sort order.
    async fn list_filtered(&self, filter: &ProductFilter) -> AppResult<Vec<Product>>;

    /// Returns names colliding with a rename to `base_name`: every name
    /// matching `base_name` or `"base_name (n)"` case-insensitively,
    /// excluding the record being renamed.
    async fn conflicting_names(
        &self,
        base_name: &str,
        exclude: ProductId,
    ) -> AppResult<Vec<String>>;

    /// Returns names already taken by copies of `base_name`: every name
    /// matching `"base_name (Copy)"` or `"base_name (Copy n)"`
    /// case-insensitively.
    async fn conflicting_copy_names(&self, base_name: &str) -> AppResult<Vec<String>>;
}
