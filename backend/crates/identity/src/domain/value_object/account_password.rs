//! Account Password Value Object
//!
//! Domain wrapper around `platform::password` for credential storage.
//!
//! ## Security Features
//! - Argon2id hashing (memory-hard), salt embedded in the PHC output
//! - Automatic memory zeroization of the plaintext
//! - Constant-time comparison
//! - Unicode NFKC normalization

use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
use platform::password::{ClearTextPassword, HashedPassword, HashingCost, PasswordHashError};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Wrapper around `ClearTextPassword` with domain-specific error handling.
/// Memory is automatically zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a new raw password with validation
    ///
    /// ## Validation Rules
    /// - Minimum 6 characters
    /// - Maximum 128 characters
    /// - No control characters
    /// - Unicode NFKC normalized
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw)
            .map_err(|e| AppError::bad_request(e.to_string()))?;

        Ok(Self(clear_text))
    }

    /// Access the inner ClearTextPassword
    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Account Password (Hashed, for storage)
// ============================================================================

/// Hashed account password for database storage
///
/// Stores password in Argon2id PHC string format.
/// Safe to store in database and logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountPassword(HashedPassword);

impl AccountPassword {
    /// Create from raw password by hashing
    ///
    /// ## Arguments
    /// * `raw` - The validated raw password
    /// * `pepper` - Optional application-wide secret
    /// * `cost` - Argon2id cost parameters from config
    pub fn from_raw(
        raw: &RawPassword,
        pepper: Option<&[u8]>,
        cost: HashingCost,
    ) -> AppResult<Self> {
        let hashed = raw.inner().hash(pepper, cost).map_err(|e| match e {
            PasswordHashError::HashingFailed(msg) => {
                AppError::internal(format!("Password hashing failed: {}", msg))
            }
            _ => AppError::internal("Unexpected error during password hashing"),
        })?;

        Ok(Self(hashed))
    }

    /// Create from PHC string (from database)
    ///
    /// A hash that does not parse is a configuration/data fault, not a
    /// wrong password.
    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        let hashed = HashedPassword::from_phc_string(phc_string).map_err(|_| {
            AppError::new(
                ErrorKind::InternalServerError,
                "Invalid password hash in database",
            )
        })?;

        Ok(Self(hashed))
    }

    /// Get PHC string for database storage
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw password against this hash
    ///
    /// Constant-time; returns false for a wrong password, never an error.
    ///
    /// ## Arguments
    /// * `raw` - The raw password to verify
    /// * `pepper` - Must match the pepper used during hashing
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }
}

impl fmt::Debug for AccountPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

impl fmt::Display for AccountPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[HASHED_PASSWORD]")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cost() -> HashingCost {
        HashingCost::fast_insecure()
    }

    #[test]
    fn test_raw_password_validation() {
        // Valid passwords, including the 6-character minimum
        assert!(RawPassword::new("secret1".to_string()).is_ok());
        assert!(RawPassword::new("abcdef".to_string()).is_ok());

        // Too short
        assert!(RawPassword::new("abc".to_string()).is_err());

        // Empty
        assert!(RawPassword::new("".to_string()).is_err());

        // Too long
        assert!(RawPassword::new("a".repeat(200)).is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("secret1".to_string()).unwrap();
        let hashed = AccountPassword::from_raw(&raw, None, cost()).unwrap();

        // Correct password should verify
        assert!(hashed.verify(&raw, None));

        // Wrong password should not verify (false, not an error)
        let wrong = RawPassword::new("secret2".to_string()).unwrap();
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_hash_with_pepper() {
        let raw = RawPassword::new("secret1".to_string()).unwrap();
        let pepper = b"app_secret_pepper";
        let hashed = AccountPassword::from_raw(&raw, Some(pepper), cost()).unwrap();

        assert!(hashed.verify(&raw, Some(pepper)));
        assert!(!hashed.verify(&raw, None));
        assert!(!hashed.verify(&raw, Some(b"wrong")));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let raw = RawPassword::new("secret1".to_string()).unwrap();
        let hashed = AccountPassword::from_raw(&raw, None, cost()).unwrap();

        let phc = hashed.as_phc_string().to_string();
        let restored = AccountPassword::from_phc_string(phc).unwrap();

        assert!(restored.verify(&raw, None));
    }

    #[test]
    fn test_malformed_stored_hash_is_fatal() {
        assert!(AccountPassword::from_phc_string("corrupted").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("secret1".to_string()).unwrap();
        let debug = format!("{:?}", raw);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("secret1"));

        let hashed = AccountPassword::from_raw(&raw, None, cost()).unwrap();
        let debug = format!("{:?}", hashed);
        assert!(debug.contains("HASH"));
    }
}
