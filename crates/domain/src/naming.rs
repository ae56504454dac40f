//! Display-name collision resolution.
//!
//! Renamed records take a `"Name (n)"` suffix; duplicated records take a
//! `"Name (Copy n)"` suffix. Both routines are pure: the caller fetches the
//! collision set from the record store and persists the resolved name.

use cultiva_core::{AppError, AppResult};

/// Outcome of resolving a proposed display name against its collision set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameResult {
    /// The name guaranteed unique within the supplied collision set.
    pub final_name: String,
    /// Whether the proposed name had to be adjusted.
    pub was_renamed: bool,
    /// The numeric suffix applied, when one was.
    pub applied_suffix: Option<u32>,
}

/// Resolves a rename of `base_name` against the names already taken.
///
/// `existing_names` holds every name matching `base_name` or
/// `"base_name (n)"` case-insensitively, excluding the record being renamed.
/// An unsuffixed match counts as suffix 1, so the first collision already
/// produces suffix 2. Names that match neither form are ignored.
pub fn resolve_rename(base_name: &str, existing_names: &[String]) -> AppResult<RenameResult> {
    let max_taken = existing_names
        .iter()
        .filter_map(|name| rename_suffix(base_name, name))
        .max();

    let Some(max_taken) = max_taken else {
        return Ok(RenameResult {
            final_name: base_name.to_owned(),
            was_renamed: false,
            applied_suffix: None,
        });
    };

    let next = next_suffix(max_taken)?;
    Ok(RenameResult {
        final_name: format!("{base_name} ({next})"),
        was_renamed: true,
        applied_suffix: Some(next),
    })
}

/// Resolves the name for a duplicate of `base_name`.
///
/// `existing_copy_names` holds every name matching `"base_name (Copy)"` or
/// `"base_name (Copy n)"` case-insensitively. A bare `(Copy)` counts as
/// copy 1; with no existing copies the result is `"base_name (Copy)"`.
pub fn resolve_duplicate(
    base_name: &str,
    existing_copy_names: &[String],
) -> AppResult<RenameResult> {
    let max_taken = existing_copy_names
        .iter()
        .filter_map(|name| duplicate_suffix(base_name, name))
        .max();

    let Some(max_taken) = max_taken else {
        return Ok(RenameResult {
            final_name: format!("{base_name} (Copy)"),
            was_renamed: true,
            applied_suffix: None,
        });
    };

    let next = next_suffix(max_taken)?;
    Ok(RenameResult {
        final_name: format!("{base_name} (Copy {next})"),
        was_renamed: true,
        applied_suffix: Some(next),
    })
}

fn next_suffix(max_taken: u32) -> AppResult<u32> {
    max_taken.checked_add(1).ok_or_else(|| {
        AppError::Conflict("no free name suffix remains for this base name".to_owned())
    })
}

/// Returns the suffix value `candidate` occupies for a rename of `base_name`:
/// 1 for an exact match, `n` for `"base_name (n)"`, `None` otherwise.
///
/// Comparison is case-insensitive and treats every character of `base_name`
/// literally, so names containing `.`, `*`, or `(` only match themselves.
fn rename_suffix(base_name: &str, candidate: &str) -> Option<u32> {
    let rest = strip_base(base_name, candidate)?;
    if rest.is_empty() {
        return Some(1);
    }
    parse_parenthesized_number(&rest)
}

/// Returns the copy number `candidate` occupies for a duplicate of
/// `base_name`: 1 for `"base_name (Copy)"`, `n` for `"base_name (Copy n)"`.
fn duplicate_suffix(base_name: &str, candidate: &str) -> Option<u32> {
    let rest = strip_base(base_name, candidate)?;
    let inner = rest.strip_prefix(" (")?.strip_suffix(')')?;
    if inner == "copy" {
        return Some(1);
    }
    let digits = inner.strip_prefix("copy ")?;
    parse_suffix_digits(digits)
}

/// Case-insensitively strips `base_name` from the front of `candidate`,
/// returning the lowercased remainder.
fn strip_base(base_name: &str, candidate: &str) -> Option<String> {
    let base_lower = base_name.to_lowercase();
    let candidate_lower = candidate.to_lowercase();
    candidate_lower
        .strip_prefix(&base_lower)
        .map(str::to_owned)
}

/// Parses `" (n)"` into `n`.
fn parse_parenthesized_number(rest: &str) -> Option<u32> {
    let inner = rest.strip_prefix(" (")?.strip_suffix(')')?;
    parse_suffix_digits(inner)
}

fn parse_suffix_digits(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
