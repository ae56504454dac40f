//! Activity-log actions recorded for every administrative catalog change.

use cultiva_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an activity-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityLogId(Uuid);

impl ActivityLogId {
    /// Creates a new random log identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a log identifier from an existing UUID value.
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

impl Default for ActivityLogId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActivityLogId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Administrative action recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    /// A product was created.
    CreateProduct,
    /// A product was updated.
    UpdateProduct,
    /// A product was deleted.
    DeleteProduct,
    /// A product was made publicly visible.
    PublishProduct,
    /// A product was withdrawn from the public catalog.
    UnpublishProduct,
    /// A product was duplicated.
    DuplicateProduct,
}

impl ActivityAction {
    /// Returns the storage string for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateProduct => "CREATE_PRODUCT",
            Self::UpdateProduct => "UPDATE_PRODUCT",
            Self::DeleteProduct => "DELETE_PRODUCT",
            Self::PublishProduct => "PUBLISH_PRODUCT",
            Self::UnpublishProduct => "UNPUBLISH_PRODUCT",
            Self::DuplicateProduct => "DUPLICATE_PRODUCT",
        }
    }

    /// Parses a storage string into an action.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "CREATE_PRODUCT" => Ok(Self::CreateProduct),
            "UPDATE_PRODUCT" => Ok(Self::UpdateProduct),
            "DELETE_PRODUCT" => Ok(Self::DeleteProduct),
            "PUBLISH_PRODUCT" => Ok(Self::PublishProduct),
            "UNPUBLISH_PRODUCT" => Ok(Self::UnpublishProduct),
            "DUPLICATE_PRODUCT" => Ok(Self::DuplicateProduct),
            _ => Err(AppError::Validation(format!(
                "unknown activity action '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ActivityAction;

    #[test]
    fn actions_round_trip_through_storage_strings() {
        let actions = [
            ActivityAction::CreateProduct,
            ActivityAction::UpdateProduct,
            ActivityAction::DeleteProduct,
            ActivityAction::PublishProduct,
            ActivityAction::UnpublishProduct,
            ActivityAction::DuplicateProduct,
        ];
        for action in actions {
            assert_eq!(ActivityAction::parse(action.as_str()).ok(), Some(action));
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(ActivityAction::parse("RESTOCK_PRODUCT").is_err());
    }
}
