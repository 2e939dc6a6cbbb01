//! Identity Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::domain::repository::{AccountRepository, EnrollmentRepository};
use crate::infra::postgres::PgIdentityRepository;
use crate::presentation::handlers::{self, IdentityAppState};
use crate::presentation::middleware::{IdentityMiddlewareState, require_session};

/// Create the identity router with the PostgreSQL repository
pub fn identity_router(repo: PgIdentityRepository, config: IdentityConfig) -> Router {
    identity_router_generic(repo, config)
}

/// Create a generic identity router for any repository implementation
pub fn identity_router_generic<R>(repo: R, config: IdentityConfig) -> Router
where
    R: AccountRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    let state = IdentityAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    let middleware_state = IdentityMiddlewareState {
        config: state.config.clone(),
    };

    let protected = Router::new()
        .route("/me", get(handlers::me::<R>))
        .layer(axum::middleware::from_fn(move |req, next| {
            require_session(middleware_state.clone(), req, next)
        }));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/session", get(handlers::session_status::<R>))
        .merge(protected)
        .with_state(state)
}
