//! API DTOs (Data Transfer Objects)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::register::RegisterInput;
use crate::domain::entity::account::Account;
use crate::domain::entity::profile::{EmergencyContact, Profile, ProfileDetails};
use crate::domain::value_object::{
    class_ref::{ClassId, Section},
    role::Role,
};
use crate::error::{IdentityError, IdentityResult};

// ============================================================================
// Register
// ============================================================================

/// Register request, tagged by role
///
/// One variant per role: the fields a role requires are real fields of its
/// variant, so a request missing them fails deserialization instead of
/// arriving as a bag of `None`s.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegisterRequest {
    #[serde(rename_all = "camelCase")]
    Student {
        name: String,
        email: String,
        password: String,
        phone: Option<String>,
        address: Option<String>,
        class_id: String,
        section: String,
        /// ISO 8601 date, e.g. "2008-01-01"
        date_of_birth: String,
        emergency_name: Option<String>,
        emergency_phone: Option<String>,
        emergency_relation: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Teacher {
        name: String,
        email: String,
        password: String,
        phone: Option<String>,
        address: Option<String>,
        qualification: String,
        department: String,
        experience: Option<i32>,
        salary: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Parent {
        name: String,
        email: String,
        password: String,
        phone: Option<String>,
        address: Option<String>,
        occupation: Option<String>,
        income: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Admin {
        name: String,
        email: String,
        password: String,
        phone: Option<String>,
        address: Option<String>,
    },
}

impl RegisterRequest {
    /// Validate and convert into the use-case input
    pub fn into_input(self) -> IdentityResult<RegisterInput> {
        match self {
            RegisterRequest::Student {
                name,
                email,
                password,
                phone,
                address,
                class_id,
                section,
                date_of_birth,
                emergency_name,
                emergency_phone,
                emergency_relation,
            } => {
                let date_of_birth =
                    NaiveDate::parse_from_str(&date_of_birth, "%Y-%m-%d").map_err(|_| {
                        IdentityError::Validation(
                            "dateOfBirth must be an ISO 8601 date (YYYY-MM-DD)".to_string(),
                        )
                    })?;

                Ok(RegisterInput {
                    name,
                    email,
                    password,
                    phone,
                    address,
                    details: ProfileDetails::Student {
                        class_id: ClassId::new(class_id)?,
                        section: Section::new(section)?,
                        date_of_birth,
                        emergency: EmergencyContact {
                            name: emergency_name.unwrap_or_default(),
                            phone: emergency_phone.unwrap_or_default(),
                            relation: emergency_relation.unwrap_or_default(),
                        },
                    },
                })
            }

            RegisterRequest::Teacher {
                name,
                email,
                password,
                phone,
                address,
                qualification,
                department,
                experience,
                salary,
            } => {
                let qualification = qualification.trim().to_string();
                let department = department.trim().to_string();
                if qualification.is_empty() || department.is_empty() {
                    return Err(IdentityError::Validation(
                        "Missing required fields for teacher registration".to_string(),
                    ));
                }

                Ok(RegisterInput {
                    name,
                    email,
                    password,
                    phone,
                    address,
                    details: ProfileDetails::Teacher {
                        qualification,
                        department,
                        experience_years: experience,
                        salary,
                    },
                })
            }

            RegisterRequest::Parent {
                name,
                email,
                password,
                phone,
                address,
                occupation,
                income,
            } => Ok(RegisterInput {
                name,
                email,
                password,
                phone,
                address,
                details: ProfileDetails::Parent { occupation, income },
            }),

            RegisterRequest::Admin {
                name,
                email,
                password,
                phone,
                address,
            } => Ok(RegisterInput {
                name,
                email,
                password,
                phone,
                address,
                details: ProfileDetails::Admin,
            }),
        }
    }
}

/// Register response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: AccountSummary,
}

// ============================================================================
// Login
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: AccountSummary,
    pub token: String,
    /// Absolute token expiry (Unix timestamp ms)
    pub expires_at_ms: i64,
}

// ============================================================================
// Session Status
// ============================================================================

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub account_id: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub expires_at_ms: Option<i64>,
}

// ============================================================================
// Account Summary
// ============================================================================

/// Role-appropriate public view of an account and its profile
///
/// Password hash excluded by construction; role-specific fields are
/// flattened and omitted for other roles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    // Student fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<i32>,

    // Teacher fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,

    // Teacher/Admin field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    // Parent fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
}

impl AccountSummary {
    pub fn from_parts(account: &Account, profile: &Profile) -> Self {
        let mut summary = Self {
            id: account.account_id.to_string(),
            name: account.name.as_str().to_string(),
            email: account.email.as_str().to_string(),
            role: account.role,
            phone: account.phone.clone(),
            address: account.address.clone(),
            student_code: None,
            class_id: None,
            section: None,
            roll_number: None,
            teacher_code: None,
            qualification: None,
            department: None,
            parent_code: None,
            occupation: None,
        };

        match profile {
            Profile::Student(p) => {
                summary.student_code = Some(p.student_code.to_string());
                summary.class_id = Some(p.class_id.to_string());
                summary.section = Some(p.section.to_string());
                summary.roll_number = Some(p.roll_number.as_i32());
            }
            Profile::Teacher(p) => {
                summary.teacher_code = Some(p.teacher_code.to_string());
                summary.qualification = Some(p.qualification.clone());
                summary.department = Some(p.department.clone());
            }
            Profile::Parent(p) => {
                summary.parent_code = Some(p.parent_code.to_string());
                summary.occupation = Some(p.occupation.clone());
            }
            Profile::Admin(p) => {
                summary.department = Some(p.department.clone());
            }
        }

        summary
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_register_request() {
        let json = r#"{
            "name": "Asha",
            "email": "Asha@x.com",
            "password": "secret1",
            "role": "STUDENT",
            "classId": "10",
            "section": "A",
            "dateOfBirth": "2008-01-01"
        }"#;

        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        let input = req.into_input().unwrap();

        let ProfileDetails::Student {
            class_id,
            section,
            date_of_birth,
            emergency,
        } = &input.details
        else {
            panic!("expected student details");
        };
        assert_eq!(class_id.as_str(), "10");
        assert_eq!(section.as_str(), "A");
        assert_eq!(date_of_birth.to_string(), "2008-01-01");
        assert_eq!(emergency.name, "");
    }

    #[test]
    fn test_student_request_missing_class_fails_deserialization() {
        let json = r#"{
            "name": "Asha",
            "email": "asha@x.com",
            "password": "secret1",
            "role": "STUDENT",
            "section": "A",
            "dateOfBirth": "2008-01-01"
        }"#;

        assert!(serde_json::from_str::<RegisterRequest>(json).is_err());
    }

    #[test]
    fn test_student_request_bad_date_is_validation_error() {
        let json = r#"{
            "name": "Asha",
            "email": "asha@x.com",
            "password": "secret1",
            "role": "STUDENT",
            "classId": "10",
            "section": "A",
            "dateOfBirth": "01/01/2008"
        }"#;

        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(
            req.into_input(),
            Err(IdentityError::Validation(_))
        ));
    }

    #[test]
    fn test_teacher_request_defaults() {
        let json = r#"{
            "name": "Ravi Kumar",
            "email": "ravi@x.com",
            "password": "secret1",
            "role": "TEACHER",
            "qualification": "M.Sc",
            "department": "Science"
        }"#;

        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        let input = req.into_input().unwrap();

        let ProfileDetails::Teacher {
            experience_years,
            salary,
            ..
        } = &input.details
        else {
            panic!("expected teacher details");
        };
        assert_eq!(*experience_years, None);
        assert_eq!(*salary, None);
    }

    #[test]
    fn test_teacher_request_blank_department_rejected() {
        let json = r#"{
            "name": "Ravi Kumar",
            "email": "ravi@x.com",
            "password": "secret1",
            "role": "TEACHER",
            "qualification": "M.Sc",
            "department": "   "
        }"#;

        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(
            req.into_input(),
            Err(IdentityError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let json = r#"{
            "name": "Nobody",
            "email": "n@x.com",
            "password": "secret1",
            "role": "PRINCIPAL"
        }"#;

        assert!(serde_json::from_str::<RegisterRequest>(json).is_err());
    }

    #[test]
    fn test_login_request() {
        let json = r#"{"email": "asha@x.com", "password": "secret1", "role": "STUDENT"}"#;
        let req: LoginRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.role, Role::Student);
    }

    #[test]
    fn test_account_summary_omits_other_roles_fields() {
        use crate::domain::entity::profile::{ADMIN_DEPARTMENT, AdminProfile};
        use crate::domain::value_object::{
            account_password::{AccountPassword, RawPassword},
            email::Email,
            person_name::PersonName,
        };
        use platform::password::HashingCost;

        let raw = RawPassword::new("secret1".to_string()).unwrap();
        let hash = AccountPassword::from_raw(&raw, None, HashingCost::fast_insecure()).unwrap();
        let account = Account::new(
            PersonName::new("Head Admin").unwrap(),
            Email::new("admin@x.com").unwrap(),
            hash,
            Role::Admin,
            None,
            None,
        );
        let profile = Profile::Admin(AdminProfile {
            account_id: account.account_id,
            department: ADMIN_DEPARTMENT.to_string(),
        });

        let summary = AccountSummary::from_parts(&account, &profile);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["role"], "ADMIN");
        assert_eq!(json["department"], ADMIN_DEPARTMENT);
        assert!(json.get("studentCode").is_none());
        assert!(json.get("rollNumber").is_none());
        // Never leak credentials
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
