//! Account Entity
//!
//! One account per person, across all roles. The password hash lives here;
//! the role-specific data lives in the matching `Profile` row, created in
//! the same transaction.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_id::AccountId, account_password::AccountPassword, account_status::AccountStatus,
    email::Email, person_name::PersonName, role::Role,
};

/// Account entity
#[derive(Debug, Clone)]
pub struct Account {
    /// Internal UUID identifier
    pub account_id: AccountId,
    /// Display name
    pub name: PersonName,
    /// Login key; unique on the normalized (lowercased) form
    pub email: Email,
    /// Argon2id PHC hash
    pub password_hash: AccountPassword,
    /// Role (Admin, Teacher, Student, Parent)
    pub role: Role,
    /// Status (Active, Inactive)
    pub status: AccountStatus,
    /// Contact phone (optional)
    pub phone: Option<String>,
    /// Contact address (optional)
    pub address: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new active account
    pub fn new(
        name: PersonName,
        email: Email,
        password_hash: AccountPassword,
        role: Role,
        phone: Option<String>,
        address: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            account_id: AccountId::new(),
            name,
            email,
            password_hash,
            role,
            status: AccountStatus::default(),
            phone,
            address,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the account may authenticate
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::HashingCost;

    use crate::domain::value_object::account_password::RawPassword;

    fn account(role: Role) -> Account {
        let raw = RawPassword::new("secret1".to_string()).unwrap();
        let hash =
            AccountPassword::from_raw(&raw, None, HashingCost::fast_insecure()).unwrap();
        Account::new(
            PersonName::new("Asha").unwrap(),
            Email::new("asha@x.com").unwrap(),
            hash,
            role,
            None,
            None,
        )
    }

    #[test]
    fn test_new_account_is_active() {
        let account = account(Role::Student);
        assert_eq!(account.status, AccountStatus::Active);
        assert!(account.can_login());
    }

    #[test]
    fn test_inactive_account_cannot_login() {
        let mut account = account(Role::Teacher);
        account.status = AccountStatus::Inactive;
        assert!(!account.can_login());
    }
}
