//! Register Use Case
//!
//! Creates a new account and its role-specific profile.
//!
//! Ordering matters: all validation and the password hash happen before the
//! write transaction; the account row and exactly one profile row are then
//! committed as a single atomic unit, bounded by the store timeout. A
//! transient roll-number collision (lost race against a concurrent
//! registration into the same class/section) is retried once.

use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::domain::entity::{
    account::Account,
    profile::{Profile, ProfileDetails},
};
use crate::domain::repository::{AccountRepository, EnrollmentRepository};
use crate::domain::value_object::{
    account_password::{AccountPassword, RawPassword},
    email::Email,
    person_name::PersonName,
};
use crate::error::{IdentityError, IdentityResult};

/// Register input (already role-typed; see `presentation::dto`)
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub details: ProfileDetails,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub account: Account,
    pub profile: Profile,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: AccountRepository + EnrollmentRepository,
{
    repo: Arc<R>,
    config: Arc<IdentityConfig>,
}

impl<R> RegisterUseCase<R>
where
    R: AccountRepository + EnrollmentRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> IdentityResult<RegisterOutput> {
        // Validate before any store mutation
        let name = PersonName::new(input.name)?;
        let email = Email::new(input.email)?;

        if self.repo.exists_by_email(&email).await? {
            return Err(IdentityError::EmailExists);
        }

        let raw_password = RawPassword::new(input.password)?;
        let password_hash =
            AccountPassword::from_raw(&raw_password, self.config.pepper(), self.config.hashing_cost)?;

        let account = Account::new(
            name,
            email,
            password_hash,
            input.details.role(),
            input.phone,
            input.address,
        );

        let profile = self.create_with_retry(&account, &input.details).await?;

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            "Account registered"
        );

        Ok(RegisterOutput { account, profile })
    }

    /// One retry on a transient allocation collision; everything else
    /// propagates immediately.
    async fn create_with_retry(
        &self,
        account: &Account,
        details: &ProfileDetails,
    ) -> IdentityResult<Profile> {
        match self.create_timed(account, details).await {
            Err(IdentityError::AllocationConflict) => {
                tracing::warn!(
                    account_id = %account.account_id,
                    "Allocation collision, retrying registration once"
                );
                self.create_timed(account, details).await
            }
            other => other,
        }
    }

    /// The single write transaction, bounded by the store timeout.
    ///
    /// On timeout the sqlx future is dropped and the open transaction rolls
    /// back; no account row survives without its profile.
    async fn create_timed(
        &self,
        account: &Account,
        details: &ProfileDetails,
    ) -> IdentityResult<Profile> {
        tokio::time::timeout(
            self.config.store_timeout,
            self.repo.create_account_with_profile(account, details),
        )
        .await
        .map_err(|_| IdentityError::StoreTimeout)?
    }
}
