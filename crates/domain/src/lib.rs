//! Domain types and pure business rules for the Cultiva catalog backend.

#![forbid(unsafe_code)]

/// Activity-log actions and identifiers.
pub mod activity;
/// Display-name collision resolution for renames and duplication.
pub mod naming;
/// Product catalog types and validation rules.
pub mod product;
/// Retention cutoff computation and record classification.
pub mod retention;
/// User identity types and credential validation rules.
pub mod user;

pub use activity::{ActivityAction, ActivityLogId};
pub use naming::{RenameResult, resolve_duplicate, resolve_rename};
pub use product::{
    Category, DosageLine, DosageUnit, PackagingOption, PackagingType, Product, ProductDraft,
    ProductId, ProductPatch,
};
pub use retention::{
    CleanupClassification, RecordRef, RetentionPolicy, classify, compute_cutoff,
};
pub use user::{EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserId, validate_password};
