//! Email Value Object
//!
//! The normalized login key. Uniqueness is enforced on this normalized form
//! (NFKC, trimmed, lowercased), so `Asha@x.com` and `asha@x.com` are the
//! same account.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Email address value object, always stored in normalized form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create a new email with normalization and validation
    pub fn new(email: impl Into<String>) -> AppResult<Self> {
        let email: String = email.into();
        let email: String = email.nfkc().collect();
        let email = email.trim().to_lowercase();

        if email.is_empty() {
            return Err(AppError::bad_request("Email cannot be empty"));
        }

        if email.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Email must be at most {} characters",
                EMAIL_MAX_LENGTH
            )));
        }

        if !Self::is_valid_format(&email) {
            return Err(AppError::bad_request("Invalid email format"));
        }

        Ok(Self(email))
    }

    /// Basic email format validation
    fn is_valid_format(email: &str) -> bool {
        // Must contain exactly one @
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            return false;
        }

        let local = parts[0];
        let domain = parts[1];

        // Local part checks
        if local.is_empty() || local.len() > 64 {
            return false;
        }

        // Domain checks
        if domain.is_empty() || !domain.contains('.') {
            return false;
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        // Domain shouldn't start or end with dot or hyphen
        if domain.starts_with('.') || domain.ends_with('.') {
            return false;
        }
        if domain.starts_with('-') || domain.ends_with('-') {
            return false;
        }

        true
    }

    /// Create from database value (assumed already normalized)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to string for database storage
    pub fn into_db(self) -> String {
        self.0
    }
}

impl FromStr for Email {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::new("asha@x.com").is_ok());
        assert!(Email::new("Asha@X.COM").is_ok()); // Should lowercase
        assert!(Email::new("first.last@school.ac.in").is_ok());
        assert!(Email::new("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        assert!(Email::new("").is_err());
        assert!(Email::new("ashax.com").is_err());
        assert!(Email::new("asha@").is_err());
        assert!(Email::new("@x.com").is_err());
        assert!(Email::new("asha@@x.com").is_err());
        assert!(Email::new("asha@x").is_err());
    }

    #[test]
    fn test_email_case_normalization() {
        let email = Email::new("Asha@X.COM").unwrap();
        assert_eq!(email.as_str(), "asha@x.com");

        // Both letter-case variants compare equal after construction
        assert_eq!(email, Email::new("asha@x.com").unwrap());
    }

    #[test]
    fn test_email_trims_whitespace() {
        let email = Email::new("  asha@x.com  ").unwrap();
        assert_eq!(email.as_str(), "asha@x.com");
    }
}
