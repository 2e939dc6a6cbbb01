//! Account Status Value Object
//!
//! Two externally observable states only. An account mid-registration
//! exists solely inside its transaction; it either becomes Active on commit
//! or ceases to exist on rollback, so no "pending" state is stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum AccountStatus {
    /// Normal active account - may authenticate
    #[default]
    Active = 0,

    /// Deactivated account - authentication refused
    Inactive = 1,
}

impl AccountStatus {
    /// Get numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    /// Get string code for serialization/API
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Check if authentication is allowed
    #[inline]
    pub const fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Create from numeric ID
    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Active),
            1 => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
