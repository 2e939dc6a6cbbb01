use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role
///
/// Closed set: every account is exactly one of these, and each role owns
/// exactly one profile kind. Matches over `Role` are exhaustive so adding a
/// role is a compile-time-checked change.
///
/// Wire form is SCREAMING_SNAKE_CASE ("STUDENT"); database form is `id()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum Role {
    Admin = 0,
    Teacher = 1,
    Student = 2,
    Parent = 3,
}

impl Role {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use Role::*;
        match self {
            Admin => "admin",
            Teacher => "teacher",
            Student => "student",
            Parent => "parent",
        }
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use Role::*;
        match id {
            0 => Some(Admin),
            1 => Some(Teacher),
            2 => Some(Student),
            3 => Some(Parent),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use Role::*;
        match code {
            "admin" => Some(Admin),
            "teacher" => Some(Teacher),
            "student" => Some(Student),
            "parent" => Some(Parent),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_id() {
        assert_eq!(Role::from_id(0), Some(Role::Admin));
        assert_eq!(Role::from_id(1), Some(Role::Teacher));
        assert_eq!(Role::from_id(2), Some(Role::Student));
        assert_eq!(Role::from_id(3), Some(Role::Parent));
        assert_eq!(Role::from_id(99), None);
    }

    #[test]
    fn test_role_from_code() {
        assert_eq!(Role::from_code("admin"), Some(Role::Admin));
        assert_eq!(Role::from_code("teacher"), Some(Role::Teacher));
        assert_eq!(Role::from_code("student"), Some(Role::Student));
        assert_eq!(Role::from_code("parent"), Some(Role::Parent));
        assert_eq!(Role::from_code("moderator"), None);
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"STUDENT\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"TEACHER\"").unwrap(),
            Role::Teacher
        );
        assert!(serde_json::from_str::<Role>("\"PRINCIPAL\"").is_err());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Parent.to_string(), "parent");
    }
}
