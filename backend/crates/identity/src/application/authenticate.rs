//! Authenticate Use Case
//!
//! Verifies credentials and mints a session token. Read-only apart from the
//! stateless token issuance.
//!
//! Enumeration resistance: "email not found", "role mismatch", and "wrong
//! password" all return the identical `InvalidCredentials` error. The
//! account lookup matches normalized email AND claimed role AND active
//! status in one query, so none of the three is distinguishable externally.

use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::application::token::{IssuedToken, TokenIssuer};
use crate::domain::entity::{account::Account, profile::Profile};
use crate::domain::repository::{AccountRepository, EnrollmentRepository};
use crate::domain::value_object::{account_password::RawPassword, email::Email, role::Role};
use crate::error::{IdentityError, IdentityResult};

/// Authenticate input
pub struct AuthenticateInput {
    pub email: String,
    pub password: String,
    /// Role the caller claims to hold; must match the account's role
    pub claimed_role: Role,
}

/// Authenticate output
#[derive(Debug)]
pub struct AuthenticateOutput {
    pub account: Account,
    pub profile: Profile,
    pub issued: IssuedToken,
}

/// Authenticate use case
pub struct AuthenticateUseCase<R>
where
    R: AccountRepository + EnrollmentRepository,
{
    repo: Arc<R>,
    config: Arc<IdentityConfig>,
}

impl<R> AuthenticateUseCase<R>
where
    R: AccountRepository + EnrollmentRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: AuthenticateInput) -> IdentityResult<AuthenticateOutput> {
        // Malformed input is a validation failure, not a credential failure
        let email = Email::new(input.email)?;

        // Single lookup: normalized email + claimed role + active status
        let account = self
            .repo
            .find_active_by_email_and_role(&email, input.claimed_role)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        let raw_password =
            RawPassword::new(input.password).map_err(|_| IdentityError::InvalidCredentials)?;

        if !account
            .password_hash
            .verify(&raw_password, self.config.pepper())
        {
            return Err(IdentityError::InvalidCredentials);
        }

        // The matching profile must exist; its absence is an invariant
        // violation, not a client error
        let profile = self
            .repo
            .find_profile(&account.account_id, account.role)
            .await?
            .ok_or_else(|| {
                IdentityError::Internal(format!(
                    "Account {} has no {} profile",
                    account.account_id, account.role
                ))
            })?;

        let issuer = TokenIssuer::new(self.config.token_secret);
        let issued = issuer.issue(
            &account.account_id,
            &account.email,
            account.role,
            self.config.token_ttl,
        )?;

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            "Account authenticated"
        );

        Ok(AuthenticateOutput {
            account,
            profile,
            issued,
        })
    }
}
