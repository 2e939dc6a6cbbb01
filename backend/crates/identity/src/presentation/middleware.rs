//! Identity Middleware
//!
//! Middleware for requiring a valid session token on protected routes.
//! Verification is stateless: the token's signature and expiry are checked,
//! no store lookup happens here.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::application::token::TokenIssuer;
use crate::error::IdentityError;
use crate::presentation::handlers::extract_token;

/// Middleware state
#[derive(Clone)]
pub struct IdentityMiddlewareState {
    pub config: Arc<IdentityConfig>,
}

/// Middleware that requires a valid session token
///
/// On success the verified [`TokenClaims`](crate::application::TokenClaims)
/// are inserted into request extensions for downstream handlers.
pub async fn require_session(
    state: IdentityMiddlewareState,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token(req.headers(), &state.config)
        .ok_or_else(|| IdentityError::TokenMalformed.into_response())?;

    let issuer = TokenIssuer::new(state.config.token_secret);
    let claims = issuer.verify(&token).map_err(|e| e.into_response())?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
