//! PostgreSQL Repository Implementations

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::entity::account::Account;
use crate::domain::entity::profile::{
    AdminProfile, EmergencyContact, ParentProfile, Profile, ProfileDetails, StudentProfile,
    TeacherProfile,
};
use crate::domain::repository::{AccountRepository, EnrollmentRepository, RollSequence};
use crate::domain::service::ProfileFactory;
use crate::domain::value_object::{
    account_id::AccountId,
    account_password::AccountPassword,
    account_status::AccountStatus,
    class_ref::{ClassId, RollNumber, Section},
    email::Email,
    person_code::{ParentCode, StudentCode, TeacherCode},
    person_name::PersonName,
    role::Role,
};
use crate::error::{IdentityError, IdentityResult};

/// PostgreSQL-backed identity repository
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique violation onto the domain conflict it represents.
///
/// The email constraint is the duplicate-account case; every other unique
/// constraint here (roll number, person codes) is an allocation collision,
/// which the register use case retries once.
fn map_unique_violation(err: sqlx::Error) -> IdentityError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return match db_err.constraint() {
                Some("accounts_email_key") => IdentityError::EmailExists,
                _ => IdentityError::AllocationConflict,
            };
        }
    }
    IdentityError::Database(err)
}

// ============================================================================
// Roll Sequence (transaction-scoped)
// ============================================================================

/// Roll-number allocator bound to one open transaction.
///
/// Takes `pg_advisory_xact_lock` on the (class, section) pair before reading
/// MAX(roll_number), so two concurrent registrations into the same section
/// serialize: the second waits, then reads a MAX that includes the first's
/// committed insert. The lock releases with the transaction.
pub struct PgRollSequence<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> PgRollSequence<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }
}

impl RollSequence for PgRollSequence<'_> {
    async fn next_roll_number(
        &mut self,
        class_id: &ClassId,
        section: &Section,
    ) -> IdentityResult<RollNumber> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{}:{}", class_id.as_str(), section.as_str()))
            .execute(&mut *self.conn)
            .await?;

        let next: i32 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(roll_number), 0) + 1
            FROM student_profiles
            WHERE class_id = $1 AND section = $2
            "#,
        )
        .bind(class_id.as_str())
        .bind(section.as_str())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(RollNumber::new(next)?)
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgIdentityRepository {
    async fn exists_by_email(&self, email: &Email) -> IdentityResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_active_by_email_and_role(
        &self,
        email: &Email,
        role: Role,
    ) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                name,
                email,
                password_hash,
                role,
                status,
                phone,
                address,
                created_at,
                updated_at
            FROM accounts
            WHERE email = $1 AND role = $2 AND status = $3
            "#,
        )
        .bind(email.as_str())
        .bind(role.id())
        .bind(AccountStatus::Active.id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                name,
                email,
                password_hash,
                role,
                status,
                phone,
                address,
                created_at,
                updated_at
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }
}

// ============================================================================
// Enrollment Repository Implementation
// ============================================================================

impl EnrollmentRepository for PgIdentityRepository {
    async fn create_account_with_profile(
        &self,
        account: &Account,
        details: &ProfileDetails,
    ) -> IdentityResult<Profile> {
        let mut tx = self.pool.begin().await?;

        insert_account(&mut tx, account).await?;

        // Build the profile inside the same transaction so the allocation
        // read and the insert consuming it are one atomic unit
        let profile = {
            let mut sequence = PgRollSequence::new(&mut tx);
            ProfileFactory::build(&account.account_id, details, &mut sequence).await?
        };

        insert_profile(&mut tx, &profile).await?;

        tx.commit().await?;

        Ok(profile)
    }

    async fn find_profile(
        &self,
        account_id: &AccountId,
        role: Role,
    ) -> IdentityResult<Option<Profile>> {
        match role {
            Role::Student => {
                let row = sqlx::query_as::<_, StudentProfileRow>(
                    r#"
                    SELECT
                        account_id,
                        student_code,
                        class_id,
                        section,
                        roll_number,
                        date_of_birth,
                        admission_date,
                        emergency_name,
                        emergency_phone,
                        emergency_relation
                    FROM student_profiles
                    WHERE account_id = $1
                    "#,
                )
                .bind(account_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

                row.map(|r| r.into_profile()).transpose()
            }
            Role::Teacher => {
                let row = sqlx::query_as::<_, TeacherProfileRow>(
                    r#"
                    SELECT
                        account_id,
                        teacher_code,
                        qualification,
                        department,
                        experience_years,
                        salary,
                        joining_date
                    FROM teacher_profiles
                    WHERE account_id = $1
                    "#,
                )
                .bind(account_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

                row.map(|r| r.into_profile()).transpose()
            }
            Role::Parent => {
                let row = sqlx::query_as::<_, ParentProfileRow>(
                    r#"
                    SELECT
                        account_id,
                        parent_code,
                        occupation,
                        income
                    FROM parent_profiles
                    WHERE account_id = $1
                    "#,
                )
                .bind(account_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

                row.map(|r| r.into_profile()).transpose()
            }
            Role::Admin => {
                let row = sqlx::query_as::<_, AdminProfileRow>(
                    r#"
                    SELECT
                        account_id,
                        department
                    FROM admin_profiles
                    WHERE account_id = $1
                    "#,
                )
                .bind(account_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

                Ok(row.map(|r| r.into_profile()))
            }
        }
    }
}

// ============================================================================
// Insert helpers (transaction-scoped)
// ============================================================================

async fn insert_account(conn: &mut PgConnection, account: &Account) -> IdentityResult<()> {
    sqlx::query(
        r#"
        INSERT INTO accounts (
            account_id,
            name,
            email,
            password_hash,
            role,
            status,
            phone,
            address,
            created_at,
            updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(account.account_id.as_uuid())
    .bind(account.name.as_str())
    .bind(account.email.as_str())
    .bind(account.password_hash.as_phc_string())
    .bind(account.role.id())
    .bind(account.status.id())
    .bind(&account.phone)
    .bind(&account.address)
    .bind(account.created_at)
    .bind(account.updated_at)
    .execute(conn)
    .await
    .map_err(map_unique_violation)?;

    Ok(())
}

async fn insert_profile(conn: &mut PgConnection, profile: &Profile) -> IdentityResult<()> {
    match profile {
        Profile::Student(p) => {
            sqlx::query(
                r#"
                INSERT INTO student_profiles (
                    account_id,
                    student_code,
                    class_id,
                    section,
                    roll_number,
                    date_of_birth,
                    admission_date,
                    emergency_name,
                    emergency_phone,
                    emergency_relation
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(p.account_id.as_uuid())
            .bind(p.student_code.as_str())
            .bind(p.class_id.as_str())
            .bind(p.section.as_str())
            .bind(p.roll_number.as_i32())
            .bind(p.date_of_birth)
            .bind(p.admission_date)
            .bind(&p.emergency.name)
            .bind(&p.emergency.phone)
            .bind(&p.emergency.relation)
            .execute(conn)
            .await
            .map_err(map_unique_violation)?;
        }
        Profile::Teacher(p) => {
            sqlx::query(
                r#"
                INSERT INTO teacher_profiles (
                    account_id,
                    teacher_code,
                    qualification,
                    department,
                    experience_years,
                    salary,
                    joining_date
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(p.account_id.as_uuid())
            .bind(p.teacher_code.as_str())
            .bind(&p.qualification)
            .bind(&p.department)
            .bind(p.experience_years)
            .bind(p.salary)
            .bind(p.joining_date)
            .execute(conn)
            .await
            .map_err(map_unique_violation)?;
        }
        Profile::Parent(p) => {
            sqlx::query(
                r#"
                INSERT INTO parent_profiles (
                    account_id,
                    parent_code,
                    occupation,
                    income
                ) VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(p.account_id.as_uuid())
            .bind(p.parent_code.as_str())
            .bind(&p.occupation)
            .bind(p.income)
            .execute(conn)
            .await
            .map_err(map_unique_violation)?;
        }
        Profile::Admin(p) => {
            sqlx::query(
                r#"
                INSERT INTO admin_profiles (
                    account_id,
                    department
                ) VALUES ($1, $2)
                "#,
            )
            .bind(p.account_id.as_uuid())
            .bind(&p.department)
            .execute(conn)
            .await
            .map_err(map_unique_violation)?;
        }
    }

    Ok(())
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: i16,
    status: i16,
    phone: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> IdentityResult<Account> {
        let role = Role::from_id(self.role)
            .ok_or_else(|| IdentityError::Internal(format!("Invalid role id: {}", self.role)))?;
        let status = AccountStatus::from_id(self.status).ok_or_else(|| {
            IdentityError::Internal(format!("Invalid status id: {}", self.status))
        })?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            name: PersonName::from_db(self.name),
            email: Email::from_db(self.email),
            password_hash: AccountPassword::from_phc_string(self.password_hash)?,
            role,
            status,
            phone: self.phone,
            address: self.address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StudentProfileRow {
    account_id: Uuid,
    student_code: String,
    class_id: String,
    section: String,
    roll_number: i32,
    date_of_birth: NaiveDate,
    admission_date: NaiveDate,
    emergency_name: String,
    emergency_phone: String,
    emergency_relation: String,
}

impl StudentProfileRow {
    fn into_profile(self) -> IdentityResult<Profile> {
        let student_code = StudentCode::parse_str(&self.student_code)
            .map_err(|e| IdentityError::Internal(format!("Invalid student code: {}", e)))?;

        Ok(Profile::Student(StudentProfile {
            account_id: AccountId::from_uuid(self.account_id),
            student_code,
            class_id: ClassId::from_db(self.class_id),
            section: Section::from_db(self.section),
            roll_number: RollNumber::new(self.roll_number)?,
            date_of_birth: self.date_of_birth,
            admission_date: self.admission_date,
            emergency: EmergencyContact {
                name: self.emergency_name,
                phone: self.emergency_phone,
                relation: self.emergency_relation,
            },
        }))
    }
}

#[derive(sqlx::FromRow)]
struct TeacherProfileRow {
    account_id: Uuid,
    teacher_code: String,
    qualification: String,
    department: String,
    experience_years: i32,
    salary: f64,
    joining_date: NaiveDate,
}

impl TeacherProfileRow {
    fn into_profile(self) -> IdentityResult<Profile> {
        let teacher_code = TeacherCode::parse_str(&self.teacher_code)
            .map_err(|e| IdentityError::Internal(format!("Invalid teacher code: {}", e)))?;

        Ok(Profile::Teacher(TeacherProfile {
            account_id: AccountId::from_uuid(self.account_id),
            teacher_code,
            qualification: self.qualification,
            department: self.department,
            experience_years: self.experience_years,
            salary: self.salary,
            joining_date: self.joining_date,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct ParentProfileRow {
    account_id: Uuid,
    parent_code: String,
    occupation: String,
    income: Option<f64>,
}

impl ParentProfileRow {
    fn into_profile(self) -> IdentityResult<Profile> {
        let parent_code = ParentCode::parse_str(&self.parent_code)
            .map_err(|e| IdentityError::Internal(format!("Invalid parent code: {}", e)))?;

        Ok(Profile::Parent(ParentProfile {
            account_id: AccountId::from_uuid(self.account_id),
            parent_code,
            occupation: self.occupation,
            income: self.income,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct AdminProfileRow {
    account_id: Uuid,
    department: String,
}

impl AdminProfileRow {
    fn into_profile(self) -> Profile {
        Profile::Admin(AdminProfile {
            account_id: AccountId::from_uuid(self.account_id),
            department: self.department,
        })
    }
}
