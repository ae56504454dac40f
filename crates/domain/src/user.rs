//! User identity types and credential validation rules.

use cultiva_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated, normalized email address.
///
/// Stored lowercased and trimmed. Validation is structural only: one `@`
/// with non-empty sides, a dot in the domain, no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let normalized = value.into().trim().to_lowercase();

        if normalized.chars().any(char::is_whitespace) {
            return Err(AppError::Validation("the email is not valid".to_owned()));
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation("the email is not valid".to_owned()));
        };

        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(AppError::Validation("the email is not valid".to_owned()));
        }

        let Some((host, tld)) = domain.rsplit_once('.') else {
            return Err(AppError::Validation("the email is not valid".to_owned()));
        };
        if host.is_empty() || tld.is_empty() {
            return Err(AppError::Validation("the email is not valid".to_owned()));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Minimum accepted password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum accepted password length. Caps Argon2id work per request.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validates a plaintext password against the account rules.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters long"
        )));
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{EmailAddress, PASSWORD_MAX_LENGTH, validate_password};
    use cultiva_core::AppResult;

    #[test]
    fn email_is_normalized_to_lowercase() -> AppResult<()> {
        let email = EmailAddress::new("  Admin@Example.COM ")?;
        assert_eq!(email.as_str(), "admin@example.com");
        Ok(())
    }

    #[test]
    fn email_without_at_sign_is_rejected() {
        assert!(EmailAddress::new("no-at-sign.example.com").is_err());
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("user@localhost").is_err());
    }

    #[test]
    fn email_with_inner_whitespace_is_rejected() {
        assert!(EmailAddress::new("user name@example.com").is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(validate_password("seven77").is_err());
    }

    #[test]
    fn eight_character_password_is_accepted() {
        assert!(validate_password("eight888").is_ok());
    }

    #[test]
    fn oversized_password_is_rejected() {
        let long = "a".repeat(PASSWORD_MAX_LENGTH + 1);
        assert!(validate_password(&long).is_err());
    }
}
