//! Profile Entities
//!
//! Role-specific record, 1:1 with an Account and discriminated by the
//! account's role. An account without its profile (or with a profile of the
//! wrong kind) must never be observable outside an in-flight transaction;
//! `ProfileFactory` plus the repository transaction enforce that.

use chrono::NaiveDate;

use crate::domain::value_object::{
    account_id::AccountId,
    class_ref::{ClassId, RollNumber, Section},
    person_code::{ParentCode, StudentCode, TeacherCode},
    role::Role,
};

/// Default department for admin profiles
pub const ADMIN_DEPARTMENT: &str = "Administration";

/// Emergency contact block on a student profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relation: String,
}

/// Student profile
#[derive(Debug, Clone)]
pub struct StudentProfile {
    pub account_id: AccountId,
    /// Public student identifier (unique)
    pub student_code: StudentCode,
    pub class_id: ClassId,
    pub section: Section,
    /// Unique within (class_id, section)
    pub roll_number: RollNumber,
    pub date_of_birth: NaiveDate,
    pub admission_date: NaiveDate,
    pub emergency: EmergencyContact,
}

/// Teacher profile
#[derive(Debug, Clone)]
pub struct TeacherProfile {
    pub account_id: AccountId,
    /// Public teacher identifier (unique)
    pub teacher_code: TeacherCode,
    pub qualification: String,
    pub department: String,
    pub experience_years: i32,
    pub salary: f64,
    pub joining_date: NaiveDate,
}

/// Parent profile
#[derive(Debug, Clone)]
pub struct ParentProfile {
    pub account_id: AccountId,
    /// Public parent identifier (unique, independently generated)
    pub parent_code: ParentCode,
    pub occupation: String,
    pub income: Option<f64>,
}

/// Admin profile
#[derive(Debug, Clone)]
pub struct AdminProfile {
    pub account_id: AccountId,
    pub department: String,
}

/// Role-specific profile, exactly one per account
#[derive(Debug, Clone)]
pub enum Profile {
    Student(StudentProfile),
    Teacher(TeacherProfile),
    Parent(ParentProfile),
    Admin(AdminProfile),
}

impl Profile {
    /// The role this profile kind belongs to
    pub fn role(&self) -> Role {
        match self {
            Profile::Student(_) => Role::Student,
            Profile::Teacher(_) => Role::Teacher,
            Profile::Parent(_) => Role::Parent,
            Profile::Admin(_) => Role::Admin,
        }
    }

    /// The owning account
    pub fn account_id(&self) -> &AccountId {
        match self {
            Profile::Student(p) => &p.account_id,
            Profile::Teacher(p) => &p.account_id,
            Profile::Parent(p) => &p.account_id,
            Profile::Admin(p) => &p.account_id,
        }
    }
}

/// Validated, role-typed creation input for a profile
///
/// One variant per role with that role's required fields as real fields, in
/// place of a single request object full of optionals. Defaultable fields
/// stay `Option` here; `ProfileFactory` applies the defaults.
#[derive(Debug, Clone)]
pub enum ProfileDetails {
    Student {
        class_id: ClassId,
        section: Section,
        date_of_birth: NaiveDate,
        emergency: EmergencyContact,
    },
    Teacher {
        qualification: String,
        department: String,
        experience_years: Option<i32>,
        salary: Option<f64>,
    },
    Parent {
        occupation: Option<String>,
        income: Option<f64>,
    },
    Admin,
}

impl ProfileDetails {
    /// The role this input creates a profile for
    pub fn role(&self) -> Role {
        match self {
            ProfileDetails::Student { .. } => Role::Student,
            ProfileDetails::Teacher { .. } => Role::Teacher,
            ProfileDetails::Parent { .. } => Role::Parent,
            ProfileDetails::Admin => Role::Admin,
        }
    }
}
