//! Use-case tests for the identity crate
//!
//! Runs the register/authenticate use cases against an in-memory repository
//! that models the store contract: atomic account+profile creation, unique
//! email, unique (class, section, roll_number).

use std::sync::{Arc, Mutex};

use crate::application::config::IdentityConfig;
use crate::application::token::TokenIssuer;
use crate::application::{
    AuthenticateInput, AuthenticateUseCase, RegisterInput, RegisterUseCase,
};
use crate::domain::entity::account::Account;
use crate::domain::entity::profile::{EmergencyContact, Profile, ProfileDetails};
use crate::domain::repository::{
    AccountRepository, EnrollmentRepository, RollSequence,
};
use crate::domain::service::ProfileFactory;
use crate::domain::value_object::{
    account_id::AccountId,
    account_status::AccountStatus,
    class_ref::{ClassId, RollNumber, Section},
    email::Email,
    role::Role,
};
use crate::error::{IdentityError, IdentityResult};
use platform::password::HashingCost;

// ============================================================================
// In-memory repository double
// ============================================================================

#[derive(Default)]
struct MemState {
    accounts: Vec<Account>,
    profiles: Vec<Profile>,
    /// Simulate the store rejecting the profile insert (constraint failure)
    fail_profile_insert: bool,
    /// Simulate losing the allocation race exactly N times
    conflicts_to_inject: u32,
}

#[derive(Clone, Default)]
struct MemRepository {
    state: Arc<Mutex<MemState>>,
}

impl MemRepository {
    fn account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    fn profile_count(&self) -> usize {
        self.state.lock().unwrap().profiles.len()
    }

    fn deactivate(&self, email: &str) {
        let mut state = self.state.lock().unwrap();
        for account in &mut state.accounts {
            if account.email.as_str() == email {
                account.status = AccountStatus::Inactive;
            }
        }
    }

    fn student_rolls(&self, class_id: &str, section: &str) -> Vec<i32> {
        let state = self.state.lock().unwrap();
        state
            .profiles
            .iter()
            .filter_map(|p| match p {
                Profile::Student(s)
                    if s.class_id.as_str() == class_id && s.section.as_str() == section =>
                {
                    Some(s.roll_number.as_i32())
                }
                _ => None,
            })
            .collect()
    }
}

/// Allocator over the shared state; max(existing) + 1, as the store does
struct MemRollSequence {
    state: Arc<Mutex<MemState>>,
}

impl RollSequence for MemRollSequence {
    async fn next_roll_number(
        &mut self,
        class_id: &ClassId,
        section: &Section,
    ) -> IdentityResult<RollNumber> {
        let state = self.state.lock().unwrap();
        let max = state
            .profiles
            .iter()
            .filter_map(|p| match p {
                Profile::Student(s) if s.class_id == *class_id && s.section == *section => {
                    Some(s.roll_number.as_i32())
                }
                _ => None,
            })
            .max()
            .unwrap_or(0);
        Ok(RollNumber::new(max + 1)?)
    }
}

impl AccountRepository for MemRepository {
    async fn exists_by_email(&self, email: &Email) -> IdentityResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.accounts.iter().any(|a| a.email == *email))
    }

    async fn find_active_by_email_and_role(
        &self,
        email: &Email,
        role: Role,
    ) -> IdentityResult<Option<Account>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts
            .iter()
            .find(|a| a.email == *email && a.role == role && a.status.can_login())
            .cloned())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts
            .iter()
            .find(|a| a.account_id == *account_id)
            .cloned())
    }
}

impl EnrollmentRepository for MemRepository {
    async fn create_account_with_profile(
        &self,
        account: &Account,
        details: &ProfileDetails,
    ) -> IdentityResult<Profile> {
        {
            let mut state = self.state.lock().unwrap();
            if state.conflicts_to_inject > 0 {
                state.conflicts_to_inject -= 1;
                return Err(IdentityError::AllocationConflict);
            }
        }

        let mut sequence = MemRollSequence {
            state: self.state.clone(),
        };
        let profile = ProfileFactory::build(&account.account_id, details, &mut sequence).await?;

        // Commit point: all-or-nothing under one lock
        let mut state = self.state.lock().unwrap();

        if state.fail_profile_insert {
            return Err(IdentityError::Database(sqlx::Error::PoolClosed));
        }

        if state.accounts.iter().any(|a| a.email == account.email) {
            return Err(IdentityError::EmailExists);
        }

        if let Profile::Student(p) = &profile {
            let duplicate = state.profiles.iter().any(|q| {
                matches!(q, Profile::Student(s)
                    if s.class_id == p.class_id
                        && s.section == p.section
                        && s.roll_number == p.roll_number)
            });
            if duplicate {
                return Err(IdentityError::AllocationConflict);
            }
        }

        state.accounts.push(account.clone());
        state.profiles.push(profile.clone());

        Ok(profile)
    }

    async fn find_profile(
        &self,
        account_id: &AccountId,
        role: Role,
    ) -> IdentityResult<Option<Profile>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .profiles
            .iter()
            .find(|p| p.account_id() == account_id && p.role() == role)
            .cloned())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn test_config() -> Arc<IdentityConfig> {
    Arc::new(IdentityConfig {
        hashing_cost: HashingCost::fast_insecure(),
        ..IdentityConfig::development()
    })
}

fn asha_input() -> RegisterInput {
    student_input("Asha", "Asha@x.com")
}

fn student_input(name: &str, email: &str) -> RegisterInput {
    RegisterInput {
        name: name.to_string(),
        email: email.to_string(),
        password: "secret1".to_string(),
        phone: None,
        address: None,
        details: ProfileDetails::Student {
            class_id: ClassId::new("10").unwrap(),
            section: Section::new("A").unwrap(),
            date_of_birth: "2008-01-01".parse().unwrap(),
            emergency: EmergencyContact::default(),
        },
    }
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_creates_account_with_exactly_one_profile() {
    let repo = Arc::new(MemRepository::default());
    let use_case = RegisterUseCase::new(repo.clone(), test_config());

    let output = use_case.execute(asha_input()).await.unwrap();

    assert_eq!(output.account.email.as_str(), "asha@x.com");
    assert_eq!(output.account.role, Role::Student);
    assert_eq!(output.profile.role(), Role::Student);
    assert_eq!(output.profile.account_id(), &output.account.account_id);

    assert_eq!(repo.account_count(), 1);
    assert_eq!(repo.profile_count(), 1);

    // First student in 10-A gets roll number 1
    let Profile::Student(profile) = &output.profile else {
        panic!("expected student profile");
    };
    assert_eq!(profile.roll_number.as_i32(), 1);
}

#[tokio::test]
async fn second_student_in_section_gets_roll_two() {
    let repo = Arc::new(MemRepository::default());
    let use_case = RegisterUseCase::new(repo.clone(), test_config());

    use_case.execute(asha_input()).await.unwrap();
    let output = use_case
        .execute(student_input("Bina", "bina@x.com"))
        .await
        .unwrap();

    let Profile::Student(profile) = &output.profile else {
        panic!("expected student profile");
    };
    assert_eq!(profile.roll_number.as_i32(), 2);
}

#[tokio::test]
async fn duplicate_email_conflicts_in_any_letter_case() {
    let repo = Arc::new(MemRepository::default());
    let use_case = RegisterUseCase::new(repo.clone(), test_config());

    use_case.execute(asha_input()).await.unwrap();

    // Same email, different case, different role: still a conflict
    let mut second = student_input("Asha Again", "ASHA@X.COM");
    second.details = ProfileDetails::Admin;

    let err = use_case.execute(second).await.unwrap_err();
    assert!(matches!(err, IdentityError::EmailExists));
    assert_eq!(repo.account_count(), 1);
}

#[tokio::test]
async fn validation_fails_before_any_store_mutation() {
    let repo = Arc::new(MemRepository::default());
    let use_case = RegisterUseCase::new(repo.clone(), test_config());

    let mut bad_email = asha_input();
    bad_email.email = "not-an-email".to_string();
    assert!(matches!(
        use_case.execute(bad_email).await,
        Err(IdentityError::Validation(_))
    ));

    let mut bad_password = asha_input();
    bad_password.password = "tiny".to_string();
    assert!(matches!(
        use_case.execute(bad_password).await,
        Err(IdentityError::Validation(_))
    ));

    assert_eq!(repo.account_count(), 0);
    assert_eq!(repo.profile_count(), 0);
}

#[tokio::test]
async fn failed_transaction_leaves_no_partial_state() {
    let repo = Arc::new(MemRepository::default());
    repo.state.lock().unwrap().fail_profile_insert = true;

    let use_case = RegisterUseCase::new(repo.clone(), test_config());
    let err = use_case.execute(asha_input()).await.unwrap_err();

    assert!(matches!(err, IdentityError::Database(_)));
    // No account survives without its profile
    assert_eq!(repo.account_count(), 0);
    assert_eq!(repo.profile_count(), 0);
}

#[tokio::test]
async fn transient_allocation_conflict_is_retried_once() {
    let repo = Arc::new(MemRepository::default());
    repo.state.lock().unwrap().conflicts_to_inject = 1;

    let use_case = RegisterUseCase::new(repo.clone(), test_config());
    let output = use_case.execute(asha_input()).await.unwrap();

    assert_eq!(output.profile.role(), Role::Student);
    assert_eq!(repo.account_count(), 1);
}

#[tokio::test]
async fn persistent_allocation_conflict_surfaces_after_one_retry() {
    let repo = Arc::new(MemRepository::default());
    repo.state.lock().unwrap().conflicts_to_inject = 2;

    let use_case = RegisterUseCase::new(repo.clone(), test_config());
    let err = use_case.execute(asha_input()).await.unwrap_err();

    assert!(matches!(err, IdentityError::AllocationConflict));
    assert_eq!(repo.account_count(), 0);
}

#[tokio::test]
async fn concurrent_registrations_get_distinct_roll_numbers() {
    let repo = Arc::new(MemRepository::default());
    let config = test_config();

    let mut handles = Vec::new();
    for i in 0..4 {
        let use_case = RegisterUseCase::new(repo.clone(), config.clone());
        handles.push(tokio::spawn(async move {
            use_case
                .execute(student_input(
                    &format!("Student {i}"),
                    &format!("student{i}@x.com"),
                ))
                .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut rolls = repo.student_rolls("10", "A");
    rolls.sort_unstable();
    assert_eq!(rolls, vec![1, 2, 3, 4]);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn authenticate_succeeds_with_matching_email_role_password() {
    let repo = Arc::new(MemRepository::default());
    let config = test_config();
    RegisterUseCase::new(repo.clone(), config.clone())
        .execute(asha_input())
        .await
        .unwrap();

    let output = AuthenticateUseCase::new(repo.clone(), config.clone())
        .execute(AuthenticateInput {
            email: "asha@x.com".to_string(),
            password: "secret1".to_string(),
            claimed_role: Role::Student,
        })
        .await
        .unwrap();

    assert_eq!(output.account.email.as_str(), "asha@x.com");
    assert_eq!(output.profile.role(), Role::Student);

    // The issued token verifies and carries the account's claims
    let issuer = TokenIssuer::new(config.token_secret);
    let claims = issuer.verify(&output.issued.token).unwrap();
    assert_eq!(claims.account_id, output.account.account_id);
    assert_eq!(claims.email, "asha@x.com");
    assert_eq!(claims.role, Role::Student);
    assert_eq!(claims.expires_at_ms, output.issued.expires_at_ms);
}

#[tokio::test]
async fn authenticate_failures_are_indistinguishable() {
    let repo = Arc::new(MemRepository::default());
    let config = test_config();
    RegisterUseCase::new(repo.clone(), config.clone())
        .execute(asha_input())
        .await
        .unwrap();

    let use_case = AuthenticateUseCase::new(repo.clone(), config.clone());

    // Wrong role (correct password), wrong password, unknown email: the
    // same error for all three
    let attempts = [
        ("asha@x.com", "secret1", Role::Teacher),
        ("asha@x.com", "wrong-password", Role::Student),
        ("nobody@x.com", "secret1", Role::Student),
    ];

    for (email, password, role) in attempts {
        let err = use_case
            .execute(AuthenticateInput {
                email: email.to_string(),
                password: password.to_string(),
                claimed_role: role,
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err, IdentityError::InvalidCredentials),
            "expected InvalidCredentials for {email}/{role}"
        );
    }
}

#[tokio::test]
async fn authenticate_normalizes_email_case() {
    let repo = Arc::new(MemRepository::default());
    let config = test_config();
    RegisterUseCase::new(repo.clone(), config.clone())
        .execute(asha_input())
        .await
        .unwrap();

    // Registered as "Asha@x.com"; any case variant logs in
    let output = AuthenticateUseCase::new(repo.clone(), config)
        .execute(AuthenticateInput {
            email: "ASHA@X.COM".to_string(),
            password: "secret1".to_string(),
            claimed_role: Role::Student,
        })
        .await
        .unwrap();

    assert_eq!(output.account.email.as_str(), "asha@x.com");
}

#[tokio::test]
async fn inactive_account_cannot_authenticate() {
    let repo = Arc::new(MemRepository::default());
    let config = test_config();
    RegisterUseCase::new(repo.clone(), config.clone())
        .execute(asha_input())
        .await
        .unwrap();

    repo.deactivate("asha@x.com");

    let err = AuthenticateUseCase::new(repo.clone(), config)
        .execute(AuthenticateInput {
            email: "asha@x.com".to_string(),
            password: "secret1".to_string(),
            claimed_role: Role::Student,
        })
        .await
        .unwrap_err();

    // Indistinguishable from any other credential failure
    assert!(matches!(err, IdentityError::InvalidCredentials));
}
