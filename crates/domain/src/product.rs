//! Product catalog domain types and validation rules.

use chrono::{DateTime, Utc};
use cultiva_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a product record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Creates a new random product identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a product identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Catalog category a product belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Fertilizer products.
    #[serde(rename = "Fertilizzanti")]
    Fertilizzanti,
    /// Potting soil products.
    #[serde(rename = "Terriccio")]
    Terriccio,
}

impl Category {
    /// Returns the storage string for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fertilizzanti => "Fertilizzanti",
            Self::Terriccio => "Terriccio",
        }
    }

    /// Parses a storage string into a category.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "Fertilizzanti" => Ok(Self::Fertilizzanti),
            "Terriccio" => Ok(Self::Terriccio),
            _ => Err(AppError::Validation(format!(
                "category must be one of: Fertilizzanti / Terriccio, got '{value}'"
            ))),
        }
    }
}

/// Unit a dosage range is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DosageUnit {
    /// Grams per hectoliter.
    #[serde(rename = "G/HL")]
    GramsPerHectoliter,
    /// Milliliters per hectoliter.
    #[serde(rename = "ML/HL")]
    MillilitersPerHectoliter,
    /// Kilograms per hectare.
    #[serde(rename = "KG/HA")]
    KilogramsPerHectare,
    /// Liters per hectare.
    #[serde(rename = "L/HA")]
    LitersPerHectare,
}

impl Default for DosageUnit {
    fn default() -> Self {
        Self::GramsPerHectoliter
    }
}

/// Packaging a product ships in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackagingType {
    /// Loose-goods bag.
    Bag,
    /// Liquid bottle.
    Bottle,
    /// Bulk big bag.
    #[serde(rename = "Big Bag")]
    BigBag,
    /// Liquid jerry can.
    #[serde(rename = "Jerry Can")]
    JerryCan,
}

/// Recommended dosage for one cultivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DosageLine {
    /// Cultivation the dosage applies to.
    pub cultivation: String,
    /// Optional application notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Lower bound of the recommended dosage.
    pub dosage_min: f64,
    /// Upper bound of the recommended dosage.
    pub dosage_max: f64,
    /// Unit both bounds are expressed in.
    #[serde(default)]
    pub unit: DosageUnit,
}

/// One packaging option for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagingOption {
    /// Packaging kind.
    #[serde(rename = "type")]
    pub kind: PackagingType,
    /// Icon shown next to this packaging option.
    pub icon: String,
    /// Optional packaged weight or volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Optional unit for `weight`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A persisted catalog product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Display name, unique per collision resolution.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price, non-negative.
    pub price: f64,
    /// Units in stock, at least one.
    pub stock: i32,
    /// URL of the main product image.
    pub image: String,
    /// Composition description.
    pub composition: String,
    /// Characteristics description.
    pub characteristics: String,
    /// Catalog category.
    pub category: Category,
    /// Dosage recommendations per cultivation.
    pub dosage: Vec<DosageLine>,
    /// Available packaging options.
    pub packaging: Vec<PackagingOption>,
    /// Whether the product is visible in the public catalog.
    pub published: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds an unpublished product from a validated draft.
    #[must_use]
    pub fn from_draft(id: ProductId, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            stock: draft.stock,
            image: draft.image,
            composition: draft.composition,
            characteristics: draft.characteristics,
            category: draft.category,
            dosage: draft.dosage,
            packaging: draft.packaging,
            published: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price.
    pub price: f64,
    /// Units in stock.
    pub stock: i32,
    /// URL of the main product image.
    pub image: String,
    /// Composition description.
    pub composition: String,
    /// Characteristics description.
    pub characteristics: String,
    /// Catalog category.
    pub category: Category,
    /// Dosage recommendations.
    pub dosage: Vec<DosageLine>,
    /// Packaging options.
    pub packaging: Vec<PackagingOption>,
}

impl ProductDraft {
    /// Validates all draft fields, reporting every violation at once.
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("product name is required".to_owned());
        }
        if self.image.trim().is_empty() {
            errors.push("product image is required".to_owned());
        }
        if self.description.trim().is_empty() {
            errors.push("product description is required".to_owned());
        }
        if self.composition.trim().is_empty() {
            errors.push("product composition is required".to_owned());
        }
        if self.characteristics.trim().is_empty() {
            errors.push("product characteristics are required".to_owned());
        }
        validate_price(self.price, &mut errors);
        validate_stock(self.stock, &mut errors);
        validate_dosage(&self.dosage, &mut errors);
        validate_packaging(&self.packaging, &mut errors);

        collect_errors(errors)
    }
}

/// Partial update for an existing product. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    /// New display name, subject to collision resolution.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New unit price.
    pub price: Option<f64>,
    /// New stock level.
    pub stock: Option<i32>,
    /// New image URL.
    pub image: Option<String>,
    /// New composition description.
    pub composition: Option<String>,
    /// New characteristics description.
    pub characteristics: Option<String>,
    /// New category.
    pub category: Option<Category>,
    /// Replacement dosage table.
    pub dosage: Option<Vec<DosageLine>>,
    /// Replacement packaging list.
    pub packaging: Option<Vec<PackagingOption>>,
}

impl ProductPatch {
    /// Returns true when the patch carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Validates every supplied field, reporting every violation at once.
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Vec::new();

        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            errors.push("if provided, name must be a non-empty string".to_owned());
        }
        if let Some(image) = &self.image
            && image.trim().is_empty()
        {
            errors.push("if provided, image must be a non-empty string".to_owned());
        }
        if let Some(price) = self.price {
            validate_price(price, &mut errors);
        }
        if let Some(stock) = self.stock {
            validate_stock(stock, &mut errors);
        }
        if let Some(dosage) = &self.dosage {
            validate_dosage(dosage, &mut errors);
        }
        if let Some(packaging) = &self.packaging {
            validate_packaging(packaging, &mut errors);
        }

        collect_errors(errors)
    }

    /// Applies the patch onto `product`, stamping the modification time.
    /// The patch name is applied as resolved by the caller.
    pub fn apply_to(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(image) = self.image {
            product.image = image;
        }
        if let Some(composition) = self.composition {
            product.composition = composition;
        }
        if let Some(characteristics) = self.characteristics {
            product.characteristics = characteristics;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(dosage) = self.dosage {
            product.dosage = dosage;
        }
        if let Some(packaging) = self.packaging {
            product.packaging = packaging;
        }
        product.updated_at = now;
    }
}

fn validate_price(price: f64, errors: &mut Vec<String>) {
    if !price.is_finite() || price < 0.0 {
        errors.push("price must be a non-negative number".to_owned());
    }
}

fn validate_stock(stock: i32, errors: &mut Vec<String>) {
    if stock < 1 {
        errors.push("stock must be at least 1".to_owned());
    }
}

fn validate_dosage(dosage: &[DosageLine], errors: &mut Vec<String>) {
    for (index, line) in dosage.iter().enumerate() {
        if line.cultivation.trim().is_empty() {
            errors.push(format!("dosage[{index}].cultivation must be a non-empty string"));
        }
        if !line.dosage_min.is_finite() || line.dosage_min < 0.0 {
            errors.push(format!("dosage[{index}].dosageMin must be a non-negative number"));
        }
        if !line.dosage_max.is_finite() || line.dosage_max < 0.0 {
            errors.push(format!("dosage[{index}].dosageMax must be a non-negative number"));
        }
    }
}

fn validate_packaging(packaging: &[PackagingOption], errors: &mut Vec<String>) {
    for (index, option) in packaging.iter().enumerate() {
        if option.icon.trim().is_empty() {
            errors.push(format!("packaging[{index}].icon must be a non-empty string"));
        }
        if let Some(weight) = option.weight
            && (!weight.is_finite() || weight < 0.0)
        {
            errors.push(format!("packaging[{index}].weight must be a non-negative number"));
        }
    }
}

fn collect_errors(errors: Vec<String>) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Category, DosageLine, DosageUnit, PackagingOption, PackagingType, Product, ProductDraft,
        ProductId, ProductPatch,
    };
    use chrono::Utc;
    use cultiva_core::AppResult;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Concime NPK".to_owned(),
            description: "Balanced fertilizer".to_owned(),
            price: 12.5,
            stock: 40,
            image: "https://cdn.example/npk.jpg".to_owned(),
            composition: "N 20, P 10, K 10".to_owned(),
            characteristics: "Granular".to_owned(),
            category: Category::Fertilizzanti,
            dosage: vec![DosageLine {
                cultivation: "Vite".to_owned(),
                notes: None,
                dosage_min: 100.0,
                dosage_max: 200.0,
                unit: DosageUnit::GramsPerHectoliter,
            }],
            packaging: vec![PackagingOption {
                kind: PackagingType::Bag,
                icon: "bag.svg".to_owned(),
                weight: Some(25.0),
                unit: Some("kg".to_owned()),
            }],
        }
    }

    #[test]
    fn valid_draft_passes_validation() -> AppResult<()> {
        draft().validate()
    }

    #[test]
    fn draft_collects_every_violation() {
        let mut invalid = draft();
        invalid.name = "  ".to_owned();
        invalid.price = -1.0;
        invalid.stock = 0;

        let Err(error) = invalid.validate() else {
            panic!("invalid draft must be rejected");
        };
        let message = error.to_string();
        assert!(message.contains("name"));
        assert!(message.contains("price"));
        assert!(message.contains("stock"));
    }

    #[test]
    fn empty_patch_is_accepted_and_detected() -> AppResult<()> {
        let patch = ProductPatch::default();
        assert!(patch.is_empty());
        patch.validate()
    }

    #[test]
    fn patch_rejects_blank_name() {
        let patch = ProductPatch {
            name: Some("   ".to_owned()),
            ..ProductPatch::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn patch_applies_only_supplied_fields() {
        let now = Utc::now();
        let mut product = Product::from_draft(ProductId::new(), draft(), now);
        let patch = ProductPatch {
            price: Some(15.0),
            ..ProductPatch::default()
        };

        let later = now + chrono::Duration::seconds(5);
        patch.apply_to(&mut product, later);
        assert_eq!(product.price, 15.0);
        assert_eq!(product.name, "Concime NPK");
        assert_eq!(product.updated_at, later);
    }

    #[test]
    fn dosage_unit_defaults_when_absent_in_payload() -> AppResult<()> {
        let line: DosageLine = serde_json::from_value(serde_json::json!({
            "cultivation": "Olivo",
            "dosageMin": 1.0,
            "dosageMax": 2.0,
        }))
        .map_err(|error| cultiva_core::AppError::Validation(error.to_string()))?;
        assert_eq!(line.unit, DosageUnit::GramsPerHectoliter);
        Ok(())
    }

    #[test]
    fn unknown_category_string_is_rejected() {
        assert!(Category::parse("Sementi").is_err());
    }
}
