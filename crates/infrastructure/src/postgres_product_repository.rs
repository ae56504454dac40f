//! PostgreSQL-backed repository for the product catalog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use cultiva_application::{ProductFilter, ProductRepository, ProductSortKey};
use cultiva_core::{AppError, AppResult};
use cultiva_domain::{Category, DosageLine, PackagingOption, Product, ProductId};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, image, composition, \
     characteristics, category, dosage, packaging, published, created_at, updated_at";

/// PostgreSQL-backed repository for product persistence.
#[derive(Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: f64,
    stock: i32,
    image: String,
    composition: String,
    characteristics: String,
    category: String,
    dosage: Json<Vec<DosageLine>>,
    packaging: Json<Vec<PackagingOption>>,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> AppResult<Product> {
        let category = Category::parse(&self.category)
            .map_err(|error| AppError::Internal(format!("corrupt product row: {error}")))?;

        Ok(Product {
            id: ProductId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            image: self.image,
            composition: self.composition,
            characteristics: self.characteristics,
            category,
            dosage: self.dosage.0,
            packaging: self.packaging.0,
            published: self.published,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn rows_into_products(rows: Vec<ProductRow>) -> AppResult<Vec<Product>> {
    rows.into_iter().map(ProductRow::into_product).collect()
}

/// Escapes every POSIX regex metacharacter so the base name matches itself
/// literally inside a collision pattern.
fn escape_regex(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        if matches!(
            character,
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}

/// Escapes LIKE wildcards in user-supplied substrings. Postgres treats
/// backslash as the default escape character.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn sort_column(key: ProductSortKey) -> &'static str {
    match key {
        ProductSortKey::Name => "name",
        ProductSortKey::Price => "price",
        ProductSortKey::Stock => "stock",
        ProductSortKey::CreatedAt => "created_at",
    }
}

fn page_bound(value: u64, name: &str) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|_| AppError::Validation(format!("{name} is out of range")))
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn insert(&self, product: &Product) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price, stock, image, composition,
                characteristics, category, dosage, packaging, published,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.image)
        .bind(&product.composition)
        .bind(&product.characteristics)
        .bind(product.category.as_str())
        .bind(Json(&product.dosage))
        .bind(Json(&product.packaging))
        .bind(product.published)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert product: {error}")))?;

        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list products: {error}")))?;

        rows_into_products(rows)
    }

    async fn list_published(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE published ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list published products: {error}"))
        })?;

        rows_into_products(rows)
    }

    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load product: {error}")))?;

        row.map(ProductRow::into_product).transpose()
    }

    async fn update(&self, product: &Product) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET name = $2,
                description = $3,
                price = $4,
                stock = $5,
                image = $6,
                composition = $7,
                characteristics = $8,
                category = $9,
                dosage = $10,
                packaging = $11,
                published = $12,
                updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.image)
        .bind(&product.composition)
        .bind(&product.characteristics)
        .bind(product.category.as_str())
        .bind(Json(&product.dosage))
        .bind(Json(&product.packaging))
        .bind(product.published)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update product: {error}")))?;

        Ok(())
    }

    async fn delete(&self, id: ProductId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete product: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count products: {error}")))?;

        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn list_page(&self, limit: u64, offset: u64) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at, id LIMIT $1 OFFSET $2"
        ))
        .bind(page_bound(limit, "limit")?)
        .bind(page_bound(offset, "page")?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to page products: {error}")))?;

        rows_into_products(rows)
    }

    async fn list_filtered(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        // The sort column is formatted in, never bound; keys come from a
        // closed enum so no user input reaches the identifier position.
        let query = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
                AND ($2::TEXT IS NULL OR category = $2)
                AND ($3::DOUBLE PRECISION IS NULL OR price >= $3)
                AND ($4::DOUBLE PRECISION IS NULL OR price <= $4)
                AND ($5::TEXT IS NULL OR EXISTS (
                    SELECT 1 FROM jsonb_array_elements(dosage) AS line
                    WHERE line->>'cultivation' ILIKE '%' || $5 || '%'
                ))
                AND ($6::TEXT IS NULL OR EXISTS (
                    SELECT 1 FROM jsonb_array_elements(packaging) AS pack
                    WHERE pack->>'type' = $6
                ))
            ORDER BY {column} {direction}, id
            "#,
            column = sort_column(filter.sort.key),
            direction = if filter.sort.descending { "DESC" } else { "ASC" },
        );

        let rows = sqlx::query_as::<_, ProductRow>(&query)
            .bind(filter.name.as_deref().map(escape_like))
            .bind(filter.category.as_deref())
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.cultivation.as_deref().map(escape_like))
            .bind(filter.package_type.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to filter products: {error}")))?;

        rows_into_products(rows)
    }

    async fn conflicting_names(
        &self,
        base_name: &str,
        exclude: ProductId,
    ) -> AppResult<Vec<String>> {
        let pattern = format!(r"^{}( \(\d+\))?$", escape_regex(base_name));

        sqlx::query_scalar::<_, String>(
            "SELECT name FROM products WHERE id <> $1 AND name ~* $2",
        )
        .bind(exclude.as_uuid())
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to query conflicting names: {error}"))
        })
    }

    async fn conflicting_copy_names(&self, base_name: &str) -> AppResult<Vec<String>> {
        let pattern = format!(r"^{} \(Copy( \d+)?\)$", escape_regex(base_name));

        sqlx::query_scalar::<_, String>("SELECT name FROM products WHERE name ~* $1")
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to query conflicting copy names: {error}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_like, escape_regex};

    #[test]
    fn regex_metacharacters_are_escaped() {
        assert_eq!(escape_regex("A.B*C"), r"A\.B\*C");
        assert_eq!(escape_regex("Bio (Plus)"), r"Bio \(Plus\)");
        assert_eq!(escape_regex("a+b?c|d"), r"a\+b\?c\|d");
        assert_eq!(escape_regex(r"back\slash"), r"back\\slash");
    }

    #[test]
    fn plain_names_pass_through_unchanged() {
        assert_eq!(escape_regex("Concime NPK 20"), "Concime NPK 20");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }
}
