//! Domain Services
//!
//! `ProfileFactory` builds exactly one role-specific profile per call. The
//! only effect outside its inputs is the roll-number allocation, which runs
//! against the caller-supplied [`RollSequence`] — inside the caller's
//! transaction, never its own.

use chrono::Utc;

use crate::domain::entity::profile::{
    ADMIN_DEPARTMENT, AdminProfile, ParentProfile, Profile, ProfileDetails, StudentProfile,
    TeacherProfile,
};
use crate::domain::repository::RollSequence;
use crate::domain::value_object::{
    account_id::AccountId,
    person_code::{ParentCode, StudentCode, TeacherCode},
};
use crate::error::IdentityResult;

pub struct ProfileFactory;

impl ProfileFactory {
    /// Build the profile for an account being registered
    ///
    /// Dispatch over `ProfileDetails` is exhaustive; adding a role fails to
    /// compile until it is handled here.
    pub async fn build<S>(
        account_id: &AccountId,
        details: &ProfileDetails,
        sequence: &mut S,
    ) -> IdentityResult<Profile>
    where
        S: RollSequence,
    {
        let today = Utc::now().date_naive();

        match details {
            ProfileDetails::Student {
                class_id,
                section,
                date_of_birth,
                emergency,
            } => {
                let roll_number = sequence.next_roll_number(class_id, section).await?;

                Ok(Profile::Student(StudentProfile {
                    account_id: *account_id,
                    student_code: StudentCode::generate(),
                    class_id: class_id.clone(),
                    section: section.clone(),
                    roll_number,
                    date_of_birth: *date_of_birth,
                    admission_date: today,
                    emergency: emergency.clone(),
                }))
            }

            ProfileDetails::Teacher {
                qualification,
                department,
                experience_years,
                salary,
            } => Ok(Profile::Teacher(TeacherProfile {
                account_id: *account_id,
                teacher_code: TeacherCode::generate(),
                qualification: qualification.clone(),
                department: department.clone(),
                experience_years: experience_years.unwrap_or(0),
                salary: salary.unwrap_or(0.0),
                joining_date: today,
            })),

            ProfileDetails::Parent { occupation, income } => Ok(Profile::Parent(ParentProfile {
                account_id: *account_id,
                parent_code: ParentCode::generate(),
                occupation: occupation.clone().unwrap_or_default(),
                income: *income,
            })),

            ProfileDetails::Admin => Ok(Profile::Admin(AdminProfile {
                account_id: *account_id,
                department: ADMIN_DEPARTMENT.to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::profile::EmergencyContact;
    use crate::domain::value_object::class_ref::{ClassId, RollNumber, Section};
    use std::collections::HashMap;

    /// In-memory counter standing in for the transactional allocator
    #[derive(Default)]
    struct CountingSequence {
        taken: HashMap<(String, String), i32>,
    }

    impl RollSequence for CountingSequence {
        async fn next_roll_number(
            &mut self,
            class_id: &ClassId,
            section: &Section,
        ) -> IdentityResult<RollNumber> {
            let key = (class_id.as_str().to_string(), section.as_str().to_string());
            let next = self.taken.entry(key).or_insert(0);
            *next += 1;
            Ok(RollNumber::new(*next).expect("positive"))
        }
    }

    fn student_details() -> ProfileDetails {
        ProfileDetails::Student {
            class_id: ClassId::new("10").unwrap(),
            section: Section::new("A").unwrap(),
            date_of_birth: "2008-01-01".parse().unwrap(),
            emergency: EmergencyContact::default(),
        }
    }

    #[tokio::test]
    async fn test_student_gets_allocated_roll_and_code() {
        let mut seq = CountingSequence::default();
        let account_id = AccountId::new();

        let profile = ProfileFactory::build(&account_id, &student_details(), &mut seq)
            .await
            .unwrap();

        match profile {
            Profile::Student(p) => {
                assert_eq!(p.roll_number.as_i32(), 1);
                assert!(p.student_code.as_str().starts_with("STU-"));
                assert_eq!(p.class_id.as_str(), "10");
                assert_eq!(p.section.as_str(), "A");
            }
            other => panic!("expected student profile, got {:?}", other.role()),
        }
    }

    #[tokio::test]
    async fn test_second_student_in_same_section_gets_next_roll() {
        let mut seq = CountingSequence::default();

        let first = ProfileFactory::build(&AccountId::new(), &student_details(), &mut seq)
            .await
            .unwrap();
        let second = ProfileFactory::build(&AccountId::new(), &student_details(), &mut seq)
            .await
            .unwrap();

        let (Profile::Student(first), Profile::Student(second)) = (first, second) else {
            panic!("expected student profiles");
        };
        assert_eq!(first.roll_number.as_i32(), 1);
        assert_eq!(second.roll_number.as_i32(), 2);
        assert_ne!(first.student_code, second.student_code);
    }

    #[tokio::test]
    async fn test_teacher_defaults() {
        let mut seq = CountingSequence::default();
        let details = ProfileDetails::Teacher {
            qualification: "B.Ed".to_string(),
            department: "Mathematics".to_string(),
            experience_years: None,
            salary: None,
        };

        let profile = ProfileFactory::build(&AccountId::new(), &details, &mut seq)
            .await
            .unwrap();

        let Profile::Teacher(p) = profile else {
            panic!("expected teacher profile");
        };
        assert_eq!(p.experience_years, 0);
        assert_eq!(p.salary, 0.0);
        assert!(p.teacher_code.as_str().starts_with("TCH-"));
    }

    #[tokio::test]
    async fn test_parent_defaults_and_independent_code() {
        let mut seq = CountingSequence::default();
        let account_id = AccountId::new();
        let details = ProfileDetails::Parent {
            occupation: None,
            income: None,
        };

        let profile = ProfileFactory::build(&account_id, &details, &mut seq)
            .await
            .unwrap();

        let Profile::Parent(p) = profile else {
            panic!("expected parent profile");
        };
        assert_eq!(p.occupation, "");
        assert_eq!(p.income, None);
        // Code is generated independently, not derived from the account id
        assert!(p.parent_code.as_str().starts_with("PAR-"));
        assert!(!p.parent_code.as_str().contains(&account_id.to_string()));
    }

    #[tokio::test]
    async fn test_admin_fixed_department() {
        let mut seq = CountingSequence::default();

        let profile = ProfileFactory::build(&AccountId::new(), &ProfileDetails::Admin, &mut seq)
            .await
            .unwrap();

        let Profile::Admin(p) = profile else {
            panic!("expected admin profile");
        };
        assert_eq!(p.department, ADMIN_DEPARTMENT);
    }

    #[tokio::test]
    async fn test_non_students_never_touch_the_sequence() {
        let mut seq = CountingSequence::default();

        ProfileFactory::build(&AccountId::new(), &ProfileDetails::Admin, &mut seq)
            .await
            .unwrap();

        assert!(seq.taken.is_empty());
    }
}
