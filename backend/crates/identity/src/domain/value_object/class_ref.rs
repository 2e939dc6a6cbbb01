//! Class Reference Value Objects
//!
//! `(ClassId, Section)` is the key roll numbers are allocated under, so both
//! are normalized here: trimmed, non-empty, bounded length. `RollNumber` is
//! the allocated position, unique within one `(ClassId, Section)` pair.

use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum length for class and section identifiers
const CLASS_REF_MAX_LENGTH: usize = 20;

fn validate_ref(kind: &str, value: String) -> AppResult<String> {
    let value = value.trim().to_string();

    if value.is_empty() {
        return Err(AppError::bad_request(format!("{} cannot be empty", kind)));
    }

    if value.chars().count() > CLASS_REF_MAX_LENGTH {
        return Err(AppError::bad_request(format!(
            "{} must be at most {} characters",
            kind, CLASS_REF_MAX_LENGTH
        )));
    }

    if value.chars().any(|c| c.is_control()) {
        return Err(AppError::bad_request(format!(
            "{} contains invalid characters",
            kind
        )));
    }

    Ok(value)
}

/// Class identifier, e.g. "10"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub struct ClassId(String);

impl ClassId {
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        validate_ref("Class", value.into()).map(Self)
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Section within a class, e.g. "A"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub struct Section(String);

impl Section {
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        validate_ref("Section", value.into()).map(Self)
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Roll number within one (class, section) pair; 1-based
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
pub struct RollNumber(i32);

impl RollNumber {
    pub fn new(value: i32) -> AppResult<Self> {
        if value < 1 {
            return Err(AppError::internal(format!(
                "Roll number must be positive (got {})",
                value
            )));
        }
        Ok(Self(value))
    }

    pub const fn as_i32(&self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_id() {
        assert_eq!(ClassId::new("10").unwrap().as_str(), "10");
        assert_eq!(ClassId::new("  10  ").unwrap().as_str(), "10");
        assert!(ClassId::new("").is_err());
        assert!(ClassId::new("   ").is_err());
        assert!(ClassId::new("a".repeat(CLASS_REF_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_section() {
        assert_eq!(Section::new("A").unwrap().as_str(), "A");
        assert!(Section::new("").is_err());
        assert!(Section::new("A\u{0000}").is_err());
    }

    #[test]
    fn test_roll_number() {
        assert_eq!(RollNumber::new(1).unwrap().as_i32(), 1);
        assert_eq!(RollNumber::new(42).unwrap().as_i32(), 42);
        assert!(RollNumber::new(0).is_err());
        assert!(RollNumber::new(-3).is_err());
    }

    #[test]
    fn test_roll_number_ordering() {
        assert!(RollNumber::new(1).unwrap() < RollNumber::new(2).unwrap());
    }
}
