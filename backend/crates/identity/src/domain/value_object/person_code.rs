//! Person Code Value Objects
//!
//! Public, collision-resistant identifiers handed out to people:
//! `STU-…` for students, `TCH-…` for teachers, `PAR-…` for parents.
//! The suffix is a 12-character nanoid (URL-safe, ~72 bits of entropy),
//! generated independently per person — never derived from another id.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use kernel::error::app_error::{AppError, AppResult};
use nid::Nanoid;

/// Nanoid length for the code suffix
const CODE_SUFFIX_LENGTH: usize = 12;

/// Prefix marker for a person code kind
pub trait CodeKind {
    const PREFIX: &'static str;
}

pub struct StudentKind;
impl CodeKind for StudentKind {
    const PREFIX: &'static str = "STU";
}

pub struct TeacherKind;
impl CodeKind for TeacherKind {
    const PREFIX: &'static str = "TCH";
}

pub struct ParentKind;
impl CodeKind for ParentKind {
    const PREFIX: &'static str = "PAR";
}

pub type StudentCode = PersonCode<StudentKind>;
pub type TeacherCode = PersonCode<TeacherKind>;
pub type ParentCode = PersonCode<ParentKind>;

/// Prefixed nanoid code, e.g. `STU-V1StGXR8_Z5j`
pub struct PersonCode<T: CodeKind> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T: CodeKind> PersonCode<T> {
    /// Generate a fresh code
    pub fn generate() -> Self {
        let suffix: Nanoid<CODE_SUFFIX_LENGTH> = Nanoid::new();
        Self {
            value: format!("{}-{}", T::PREFIX, suffix),
            _marker: PhantomData,
        }
    }

    /// Parse a stored code, checking prefix and suffix alphabet
    pub fn parse_str(s: &str) -> AppResult<Self> {
        let suffix = s
            .strip_prefix(T::PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(|| {
                AppError::bad_request(format!("Code must start with \"{}-\"", T::PREFIX))
            })?;

        Nanoid::<CODE_SUFFIX_LENGTH>::from_str(suffix)
            .map_err(|e| AppError::bad_request(format!("Invalid code: {}", e)))?;

        Ok(Self {
            value: s.to_string(),
            _marker: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

// Manual impls: derives would bound the marker type.
impl<T: CodeKind> Clone for PersonCode<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: CodeKind> PartialEq for PersonCode<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: CodeKind> Eq for PersonCode<T> {}

impl<T: CodeKind> fmt::Debug for PersonCode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PersonCode({})", self.value)
    }
}

impl<T: CodeKind> fmt::Display for PersonCode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T: CodeKind> FromStr for PersonCode<T> {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Self::parse_str(s)
    }
}
