//! Catalog application service.
//!
//! Owns product lifecycle operations and records every administrative
//! mutation in the activity log. Name collisions on rename and duplication
//! are resolved through the pure domain routines; the read-then-write
//! window between fetching the collision set and persisting the record is
//! accepted as-is.

use std::sync::Arc;

use chrono::Utc;
use cultiva_core::{AppError, AppResult, AuthClaims};
use cultiva_domain::{
    ActivityAction, Product, ProductDraft, ProductId, ProductPatch, UserId, resolve_duplicate,
    resolve_rename,
};
use serde_json::{Value, json};

use crate::{ActivityRecorder, NewActivityLog, ProductFilter, ProductPage, ProductRepository};

/// Application service for the product catalog.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    activity: Arc<dyn ActivityRecorder>,
}

impl ProductService {
    /// Creates a new catalog service.
    #[must_use]
    pub fn new(products: Arc<dyn ProductRepository>, activity: Arc<dyn ActivityRecorder>) -> Self {
        Self { products, activity }
    }

    /// Creates a product from a draft and records the action.
    pub async fn create_product(
        &self,
        actor: &AuthClaims,
        draft: ProductDraft,
    ) -> AppResult<Product> {
        draft.validate()?;

        let product = Product::from_draft(ProductId::new(), draft, Utc::now());
        self.products.insert(&product).await?;

        self.record(actor, ActivityAction::CreateProduct, Some(product.id), None)
            .await?;

        Ok(product)
    }

    /// Returns the full catalog, oldest first.
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let products = self.products.list_all().await?;
        if products.is_empty() {
            return Err(AppError::NotFound("no products found".to_owned()));
        }
        Ok(products)
    }

    /// Returns the published subset of the catalog.
    pub async fn published_products(&self) -> AppResult<Vec<Product>> {
        self.products.list_published().await
    }

    /// Returns one product by identifier.
    pub async fn product_details(&self, id: ProductId) -> AppResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("product not found".to_owned()))
    }

    /// Applies a partial update, resolving name collisions when the name
    /// changes, and records the applied changes.
    pub async fn update_product(
        &self,
        actor: &AuthClaims,
        id: ProductId,
        patch: ProductPatch,
    ) -> AppResult<Product> {
        patch.validate()?;

        let mut product = self.product_details(id).await?;
        let mut patch = patch;

        if let Some(proposed) = patch.name.take() {
            let proposed = proposed.trim().to_owned();
            let conflicts = self.products.conflicting_names(&proposed, id).await?;
            let resolution = resolve_rename(&proposed, &conflicts)?;
            patch.name = Some(resolution.final_name);
        }

        let changes = patch_changes(&patch);
        patch.apply_to(&mut product, Utc::now());
        self.products.update(&product).await?;

        self.record(
            actor,
            ActivityAction::UpdateProduct,
            Some(id),
            Some(changes),
        )
        .await?;

        Ok(product)
    }

    /// Deletes a product and records the action.
    pub async fn delete_product(&self, actor: &AuthClaims, id: ProductId) -> AppResult<()> {
        if !self.products.delete(id).await? {
            return Err(AppError::NotFound("product not found".to_owned()));
        }

        self.record(actor, ActivityAction::DeleteProduct, Some(id), None)
            .await
    }

    /// Publishes or unpublishes a product and records the action.
    pub async fn set_published(
        &self,
        actor: &AuthClaims,
        id: ProductId,
        published: bool,
    ) -> AppResult<Product> {
        let mut product = self.product_details(id).await?;
        product.published = published;
        product.updated_at = Utc::now();
        self.products.update(&product).await?;

        let action = if published {
            ActivityAction::PublishProduct
        } else {
            ActivityAction::UnpublishProduct
        };
        self.record(actor, action, Some(id), None).await?;

        Ok(product)
    }

    /// Duplicates a product under a `(Copy n)` name. The copy starts
    /// unpublished regardless of the source.
    pub async fn duplicate_product(
        &self,
        actor: &AuthClaims,
        id: ProductId,
    ) -> AppResult<Product> {
        let source = self.product_details(id).await?;

        let conflicts = self.products.conflicting_copy_names(&source.name).await?;
        let resolution = resolve_duplicate(&source.name, &conflicts)?;

        let now = Utc::now();
        let copy = Product {
            id: ProductId::new(),
            name: resolution.final_name,
            published: false,
            created_at: now,
            updated_at: now,
            ..source
        };
        self.products.insert(&copy).await?;

        self.record(
            actor,
            ActivityAction::DuplicateProduct,
            Some(copy.id),
            Some(json!({
                "sourceProductId": id,
                "name": copy.name,
            })),
        )
        .await?;

        Ok(copy)
    }

    /// Returns one page of the catalog, oldest first.
    pub async fn paginate(&self, page: u32, limit: u32) -> AppResult<ProductPage> {
        let page = page.max(1);
        let limit = limit.max(1);

        let total = self.products.count().await?;
        let offset = u64::from(page - 1) * u64::from(limit);
        let products = self.products.list_page(u64::from(limit), offset).await?;

        let pages = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);

        Ok(ProductPage {
            total,
            page,
            pages,
            products,
        })
    }

    /// Returns every product matching `filter`.
    pub async fn filter_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        let products = self.products.list_filtered(filter).await?;
        if products.is_empty() {
            return Err(AppError::NotFound("no products match filters".to_owned()));
        }
        Ok(products)
    }

    async fn record(
        &self,
        actor: &AuthClaims,
        action: ActivityAction,
        product_id: Option<ProductId>,
        changes: Option<Value>,
    ) -> AppResult<()> {
        self.activity
            .record(NewActivityLog {
                action,
                product_id,
                user_id: UserId::from_uuid(actor.user_id()),
                changes,
            })
            .await
    }
}

/// Serializes the fields a patch actually carries, for the audit trail.
fn patch_changes(patch: &ProductPatch) -> Value {
    let mut fields = serde_json::Map::new();

    if let Some(name) = &patch.name {
        fields.insert("name".to_owned(), json!(name));
    }
    if let Some(description) = &patch.description {
        fields.insert("description".to_owned(), json!(description));
    }
    if let Some(price) = patch.price {
        fields.insert("price".to_owned(), json!(price));
    }
    if let Some(stock) = patch.stock {
        fields.insert("stock".to_owned(), json!(stock));
    }
    if let Some(image) = &patch.image {
        fields.insert("image".to_owned(), json!(image));
    }
    if let Some(composition) = &patch.composition {
        fields.insert("composition".to_owned(), json!(composition));
    }
    if let Some(characteristics) = &patch.characteristics {
        fields.insert("characteristics".to_owned(), json!(characteristics));
    }
    if let Some(category) = patch.category {
        fields.insert("category".to_owned(), json!(category));
    }
    if let Some(dosage) = &patch.dosage {
        fields.insert("dosage".to_owned(), json!(dosage));
    }
    if let Some(packaging) = &patch.packaging {
        fields.insert("packaging".to_owned(), json!(packaging));
    }

    Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use cultiva_core::{AppError, AppResult, AuthClaims, Role};
    use cultiva_domain::{
        ActivityAction, Category, Product, ProductDraft, ProductId, ProductPatch,
    };
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use super::ProductService;
    use crate::{
        ActivityRecorder, NewActivityLog, ProductFilter, ProductRepository, ProductSort,
    };

    struct FakeProductRepository {
        products: Mutex<Vec<Product>>,
    }

    impl FakeProductRepository {
        fn new() -> Self {
            Self {
                products: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProductRepository for FakeProductRepository {
        async fn insert(&self, product: &Product) -> AppResult<()> {
            self.products.lock().await.push(product.clone());
            Ok(())
        }

        async fn list_all(&self) -> AppResult<Vec<Product>> {
            Ok(self.products.lock().await.clone())
        }

        async fn list_published(&self) -> AppResult<Vec<Product>> {
            Ok(self
                .products
                .lock()
                .await
                .iter()
                .filter(|product| product.published)
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>> {
            Ok(self
                .products
                .lock()
                .await
                .iter()
                .find(|product| product.id == id)
                .cloned())
        }

        async fn update(&self, updated: &Product) -> AppResult<()> {
            let mut products = self.products.lock().await;
            let slot = products
                .iter_mut()
                .find(|product| product.id == updated.id)
                .ok_or_else(|| AppError::Internal("updating a missing product".to_owned()))?;
            *slot = updated.clone();
            Ok(())
        }

        async fn delete(&self, id: ProductId) -> AppResult<bool> {
            let mut products = self.products.lock().await;
            let before = products.len();
            products.retain(|product| product.id != id);
            Ok(products.len() < before)
        }

        async fn count(&self) -> AppResult<u64> {
            Ok(self.products.lock().await.len() as u64)
        }

        async fn list_page(&self, limit: u64, offset: u64) -> AppResult<Vec<Product>> {
            Ok(self
                .products
                .lock()
                .await
                .iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .cloned()
                .collect())
        }

        async fn list_filtered(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
            let matched: Vec<Product> = self
                .products
                .lock()
                .await
                .iter()
                .filter(|product| {
                    let name_ok = filter.name.as_ref().is_none_or(|needle| {
                        product.name.to_lowercase().contains(&needle.to_lowercase())
                    });
                    let category_ok = filter
                        .category
                        .as_ref()
                        .is_none_or(|category| product.category.as_str() == category);
                    let min_ok = filter.min_price.is_none_or(|min| product.price >= min);
                    let max_ok = filter.max_price.is_none_or(|max| product.price <= max);
                    name_ok && category_ok && min_ok && max_ok
                })
                .cloned()
                .collect();
            Ok(matched)
        }

        async fn conflicting_names(
            &self,
            _base_name: &str,
            exclude: ProductId,
        ) -> AppResult<Vec<String>> {
            // A superset of the matching names is fine: the resolver ignores
            // names outside the collision pattern.
            Ok(self
                .products
                .lock()
                .await
                .iter()
                .filter(|product| product.id != exclude)
                .map(|product| product.name.clone())
                .collect())
        }

        async fn conflicting_copy_names(&self, _base_name: &str) -> AppResult<Vec<String>> {
            Ok(self
                .products
                .lock()
                .await
                .iter()
                .map(|product| product.name.clone())
                .collect())
        }
    }

    struct FakeRecorder {
        entries: Mutex<Vec<NewActivityLog>>,
    }

    impl FakeRecorder {
        fn new() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ActivityRecorder for FakeRecorder {
        async fn record(&self, entry: NewActivityLog) -> AppResult<()> {
            self.entries.lock().await.push(entry);
            Ok(())
        }
    }

    fn admin() -> AuthClaims {
        AuthClaims::new(Uuid::new_v4(), Role::Admin)
    }

    fn draft(name: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_owned(),
            description: "A product".to_owned(),
            price: 10.0,
            stock: 5,
            image: "https://cdn.example/product.jpg".to_owned(),
            composition: "N 20".to_owned(),
            characteristics: "Granular".to_owned(),
            category: Category::Fertilizzanti,
            dosage: Vec::new(),
            packaging: Vec::new(),
        }
    }

    fn service() -> (ProductService, Arc<FakeProductRepository>, Arc<FakeRecorder>) {
        let repository = Arc::new(FakeProductRepository::new());
        let recorder = Arc::new(FakeRecorder::new());
        let service = ProductService::new(repository.clone(), recorder.clone());
        (service, repository, recorder)
    }

    #[tokio::test]
    async fn create_stores_the_product_and_records_the_action() -> AppResult<()> {
        let (service, repository, recorder) = service();

        let product = service.create_product(&admin(), draft("Concime NPK")).await?;

        assert!(!product.published);
        assert_eq!(repository.products.lock().await.len(), 1);

        let entries = recorder.entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ActivityAction::CreateProduct);
        assert_eq!(entries[0].product_id, Some(product.id));
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_an_invalid_draft() {
        let (service, _, _) = service();
        let mut invalid = draft("Concime NPK");
        invalid.stock = 0;
        assert!(service.create_product(&admin(), invalid).await.is_err());
    }

    #[tokio::test]
    async fn listing_an_empty_catalog_is_not_found() {
        let (service, _, _) = service();
        assert!(matches!(
            service.list_products().await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rename_collision_applies_the_next_free_suffix() -> AppResult<()> {
        let (service, _, recorder) = service();
        let actor = admin();

        for name in ["X", "X (2)", "X (5)"] {
            service.create_product(&actor, draft(name)).await?;
        }
        let target = service.create_product(&actor, draft("Old")).await?;

        let patch = ProductPatch {
            name: Some("X".to_owned()),
            ..ProductPatch::default()
        };
        let updated = service.update_product(&actor, target.id, patch).await?;

        assert_eq!(updated.name, "X (6)");

        let entries = recorder.entries.lock().await;
        let update_entry = entries
            .iter()
            .find(|entry| entry.action == ActivityAction::UpdateProduct)
            .ok_or_else(|| AppError::Internal("update action not recorded".to_owned()))?;
        let changes = update_entry
            .changes
            .as_ref()
            .ok_or_else(|| AppError::Internal("update changes not recorded".to_owned()))?;
        assert_eq!(changes["name"], "X (6)");
        Ok(())
    }

    #[tokio::test]
    async fn rename_without_collision_keeps_the_proposed_name() -> AppResult<()> {
        let (service, _, _) = service();
        let actor = admin();
        let target = service.create_product(&actor, draft("Old")).await?;

        let patch = ProductPatch {
            name: Some("Fresh".to_owned()),
            ..ProductPatch::default()
        };
        let updated = service.update_product(&actor, target.id, patch).await?;
        assert_eq!(updated.name, "Fresh");
        Ok(())
    }

    #[tokio::test]
    async fn renaming_to_the_current_name_is_stable() -> AppResult<()> {
        let (service, _, _) = service();
        let actor = admin();
        let target = service.create_product(&actor, draft("X")).await?;

        let patch = ProductPatch {
            name: Some("X".to_owned()),
            ..ProductPatch::default()
        };
        let updated = service.update_product(&actor, target.id, patch).await?;
        assert_eq!(updated.name, "X");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_takes_the_next_copy_number_and_starts_unpublished() -> AppResult<()> {
        let (service, _, recorder) = service();
        let actor = admin();

        let source = service.create_product(&actor, draft("X")).await?;
        service.set_published(&actor, source.id, true).await?;
        service.create_product(&actor, draft("X (Copy)")).await?;
        service.create_product(&actor, draft("X (Copy 3)")).await?;

        let copy = service.duplicate_product(&actor, source.id).await?;

        assert_eq!(copy.name, "X (Copy 4)");
        assert!(!copy.published);
        assert_ne!(copy.id, source.id);

        let entries = recorder.entries.lock().await;
        assert!(
            entries
                .iter()
                .any(|entry| entry.action == ActivityAction::DuplicateProduct)
        );
        Ok(())
    }

    #[tokio::test]
    async fn first_duplicate_gets_a_bare_copy_name() -> AppResult<()> {
        let (service, _, _) = service();
        let actor = admin();
        let source = service.create_product(&actor, draft("X")).await?;

        let copy = service.duplicate_product(&actor, source.id).await?;
        assert_eq!(copy.name, "X (Copy)");
        Ok(())
    }

    #[tokio::test]
    async fn deleting_a_missing_product_is_not_found() {
        let (service, _, _) = service();
        let result = service.delete_product(&admin(), ProductId::new()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn publish_and_unpublish_toggle_visibility() -> AppResult<()> {
        let (service, _, recorder) = service();
        let actor = admin();
        let product = service.create_product(&actor, draft("X")).await?;

        let published = service.set_published(&actor, product.id, true).await?;
        assert!(published.published);
        assert_eq!(service.published_products().await?.len(), 1);

        let unpublished = service.set_published(&actor, product.id, false).await?;
        assert!(!unpublished.published);
        assert!(service.published_products().await?.is_empty());

        let entries = recorder.entries.lock().await;
        let actions: Vec<ActivityAction> = entries.iter().map(|entry| entry.action).collect();
        assert!(actions.contains(&ActivityAction::PublishProduct));
        assert!(actions.contains(&ActivityAction::UnpublishProduct));
        Ok(())
    }

    #[tokio::test]
    async fn pagination_reports_page_counts() -> AppResult<()> {
        let (service, _, _) = service();
        let actor = admin();
        for index in 0..5 {
            service
                .create_product(&actor, draft(&format!("Product {index}")))
                .await?;
        }

        let page = service.paginate(3, 2).await?;
        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 3);
        assert_eq!(page.products.len(), 1);

        // Page zero falls back to the first page.
        let first = service.paginate(0, 2).await?;
        assert_eq!(first.page, 1);
        assert_eq!(first.products.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn filtering_with_no_matches_is_not_found() -> AppResult<()> {
        let (service, _, _) = service();
        let actor = admin();
        service.create_product(&actor, draft("Concime NPK")).await?;

        let filter = ProductFilter {
            name: Some("terriccio".to_owned()),
            sort: ProductSort::default(),
            ..ProductFilter::default()
        };
        assert!(matches!(
            service.filter_products(&filter).await,
            Err(AppError::NotFound(_))
        ));

        let matching = ProductFilter {
            name: Some("concime".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(service.filter_products(&matching).await?.len(), 1);
        Ok(())
    }
}
