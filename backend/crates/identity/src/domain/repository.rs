//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{
    account::Account,
    profile::{Profile, ProfileDetails},
};
use crate::domain::value_object::{
    account_id::AccountId,
    class_ref::{ClassId, RollNumber, Section},
    email::Email,
    role::Role,
};
use crate::error::IdentityResult;

/// Account repository trait (read side)
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Check if an account exists for the normalized email, any role
    async fn exists_by_email(&self, email: &Email) -> IdentityResult<bool>;

    /// Find an *active* account matching both the normalized email and the
    /// claimed role, in a single lookup
    async fn find_active_by_email_and_role(
        &self,
        email: &Email,
        role: Role,
    ) -> IdentityResult<Option<Account>>;

    /// Find account by ID
    async fn find_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>>;
}

/// Enrollment repository trait (write side)
#[trait_variant::make(EnrollmentRepository: Send)]
pub trait LocalEnrollmentRepository {
    /// Create the account row and exactly one profile row in a single
    /// atomic transaction.
    ///
    /// Roll-number allocation for students happens inside the same
    /// transaction (see [`RollSequence`]); any failure rolls the whole
    /// unit back, so an account without its profile is never committed.
    async fn create_account_with_profile(
        &self,
        account: &Account,
        details: &ProfileDetails,
    ) -> IdentityResult<Profile>;

    /// Find the profile for an account, expected to be of the given role
    async fn find_profile(
        &self,
        account_id: &AccountId,
        role: Role,
    ) -> IdentityResult<Option<Profile>>;
}

/// Roll-number allocation port
///
/// `next_roll_number` returns max(existing) + 1 for the (class, section)
/// pair. Implementations must make the read and the insert that consumes it
/// one atomic unit: the PostgreSQL implementation holds a transaction-scoped
/// advisory lock on the pair, with a UNIQUE constraint as backstop. A plain
/// read-max-then-insert without such guarding hands the same number to two
/// concurrent registrations.
#[trait_variant::make(RollSequence: Send)]
pub trait LocalRollSequence {
    async fn next_roll_number(
        &mut self,
        class_id: &ClassId,
        section: &Section,
    ) -> IdentityResult<RollNumber>;
}
