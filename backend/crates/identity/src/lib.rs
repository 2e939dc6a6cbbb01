//! Identity & Enrollment Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Role-specific registration (Admin, Teacher, Student, Parent)
//! - Account and profile created in one atomic transaction
//! - Race-safe roll-number allocation per (class, section)
//! - Stateless signed session tokens with cookie delivery
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (memory-hard, salted)
//! - Tokens HMAC-SHA256 signed, secret fixed at process start
//! - Login failures are uniform across unknown email / wrong role /
//!   wrong password to resist account enumeration

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use error::{IdentityError, IdentityResult};
pub use infra::postgres::PgIdentityRepository;
pub use presentation::router::identity_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::account::*;
    pub use crate::domain::entity::profile::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgIdentityRepository as IdentityStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
