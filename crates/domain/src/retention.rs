//! Retention cutoff computation and cleanup classification.
//!
//! Two retention policies exist as separately exposed operations: the strict
//! policy behind the preview/execute cleanup endpoints and the scheduled
//! worker, and the legacy policy behind its own endpoint. They differ in
//! minimum threshold, default threshold, and cutoff comparison, and are
//! deliberately not unified.

use chrono::{DateTime, Duration, Utc};
use cultiva_core::{AppError, AppResult};
use uuid::Uuid;

/// Seconds in one day of retention.
const SECONDS_PER_DAY: i64 = 86_400;

/// Retention rules for one cleanup operation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Requires at least 7 days, defaults to 180, deletes records created
    /// at or before the cutoff.
    Strict,
    /// Requires any positive threshold, defaults to 30, deletes records
    /// created strictly before the cutoff.
    Legacy,
}

impl RetentionPolicy {
    /// Returns the threshold applied when the caller supplies none.
    #[must_use]
    pub fn default_days(&self) -> i64 {
        match self {
            Self::Strict => 180,
            Self::Legacy => 30,
        }
    }

    /// Returns the smallest acceptable threshold in days.
    #[must_use]
    pub fn min_days(&self) -> i64 {
        match self {
            Self::Strict => 7,
            Self::Legacy => 1,
        }
    }

    /// Returns true when records created exactly at the cutoff are eligible.
    #[must_use]
    pub fn inclusive_cutoff(&self) -> bool {
        match self {
            Self::Strict => true,
            Self::Legacy => false,
        }
    }

    /// Applies the policy default and validates the threshold bounds.
    pub fn resolve_days(&self, requested: Option<i64>) -> AppResult<i64> {
        let days = requested.unwrap_or_else(|| self.default_days());
        if days < self.min_days() {
            return Err(AppError::Validation(format!(
                "older_than must be a number >= {}",
                self.min_days()
            )));
        }
        Ok(days)
    }
}

/// Reference to one record eligible for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRef {
    /// Identifier of the record in the backing store.
    pub id: Uuid,
    /// Creation timestamp the retention rule is applied to.
    pub created_at: DateTime<Utc>,
}

/// Pure partition of a record set against a retention cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupClassification {
    /// Records eligible for deletion, in input order.
    pub to_delete: Vec<Uuid>,
    /// The cutoff the partition was computed against.
    pub cutoff: DateTime<Utc>,
    /// Number of eligible records.
    pub count: usize,
}

/// Computes the retention cutoff: `now - threshold_days` in whole days.
///
/// `threshold_days` must be positive; policy-specific minimums are enforced
/// by [`RetentionPolicy::resolve_days`] before this is called.
pub fn compute_cutoff(now: DateTime<Utc>, threshold_days: i64) -> AppResult<DateTime<Utc>> {
    if threshold_days <= 0 {
        return Err(AppError::Validation(
            "older_than must be a positive number of days".to_owned(),
        ));
    }

    let seconds = threshold_days
        .checked_mul(SECONDS_PER_DAY)
        .ok_or_else(|| AppError::Validation("older_than is out of range".to_owned()))?;

    now.checked_sub_signed(Duration::seconds(seconds))
        .ok_or_else(|| AppError::Validation("older_than is out of range".to_owned()))
}

/// Partitions `records` against `cutoff`.
///
/// A record is eligible when `created_at <= cutoff` (inclusive) or
/// `created_at < cutoff` (exclusive). Kept records are simply excluded.
#[must_use]
pub fn classify(
    records: &[RecordRef],
    cutoff: DateTime<Utc>,
    inclusive: bool,
) -> CleanupClassification {
    let to_delete: Vec<Uuid> = records
        .iter()
        .filter(|record| {
            if inclusive {
                record.created_at <= cutoff
            } else {
                record.created_at < cutoff
            }
        })
        .map(|record| record.id)
        .collect();

    let count = to_delete.len();
    CleanupClassification {
        to_delete,
        cutoff,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordRef, RetentionPolicy, classify, compute_cutoff};
    use chrono::{DateTime, TimeZone, Utc};
    use cultiva_core::AppResult;
    use uuid::Uuid;

    fn instant(epoch_seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(epoch_seconds, 0).single().map_or_else(
            || panic!("invalid test timestamp {epoch_seconds}"),
            |value| value,
        )
    }

    #[test]
    fn cutoff_subtracts_whole_days() -> AppResult<()> {
        let cutoff = compute_cutoff(instant(1_000_000_000), 180)?;
        assert_eq!(cutoff.timestamp(), 984_448_000);
        Ok(())
    }

    #[test]
    fn zero_and_negative_thresholds_are_rejected() {
        let now = instant(1_000_000_000);
        assert!(compute_cutoff(now, 0).is_err());
        assert!(compute_cutoff(now, -5).is_err());
    }

    #[test]
    fn overflowing_threshold_is_rejected() {
        assert!(compute_cutoff(instant(1_000_000_000), i64::MAX).is_err());
    }

    #[test]
    fn inclusive_classification_keeps_the_boundary_record() {
        let cutoff = instant(500_000);
        let boundary = RecordRef {
            id: Uuid::new_v4(),
            created_at: cutoff,
        };
        let newer = RecordRef {
            id: Uuid::new_v4(),
            created_at: instant(500_001),
        };

        let inclusive = classify(&[boundary, newer], cutoff, true);
        assert_eq!(inclusive.to_delete, vec![boundary.id]);
        assert_eq!(inclusive.count, 1);

        let exclusive = classify(&[boundary, newer], cutoff, false);
        assert!(exclusive.to_delete.is_empty());
    }

    #[test]
    fn classification_partitions_every_record_exactly_once() {
        let cutoff = instant(1_000);
        let records: Vec<RecordRef> = (0..10)
            .map(|offset| RecordRef {
                id: Uuid::new_v4(),
                created_at: instant(995 + offset),
            })
            .collect();

        let result = classify(&records, cutoff, true);
        let kept = records.len() - result.count;
        assert_eq!(result.count + kept, records.len());
        for id in &result.to_delete {
            assert_eq!(
                records.iter().filter(|record| record.id == *id).count(),
                1
            );
        }
    }

    #[test]
    fn strict_policy_floors_at_seven_days() {
        let policy = RetentionPolicy::Strict;
        assert_eq!(policy.resolve_days(None).ok(), Some(180));
        assert_eq!(policy.resolve_days(Some(7)).ok(), Some(7));
        assert!(policy.resolve_days(Some(6)).is_err());
        assert!(policy.resolve_days(Some(0)).is_err());
        assert!(policy.resolve_days(Some(-5)).is_err());
    }

    #[test]
    fn legacy_policy_accepts_any_positive_threshold() {
        let policy = RetentionPolicy::Legacy;
        assert_eq!(policy.resolve_days(None).ok(), Some(30));
        assert_eq!(policy.resolve_days(Some(1)).ok(), Some(1));
        assert!(policy.resolve_days(Some(0)).is_err());
        assert!(policy.resolve_days(Some(-5)).is_err());
    }
}
