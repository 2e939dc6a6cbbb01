//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use platform::cookie::CookieConfig;

use crate::application::config::IdentityConfig;
use crate::application::token::TokenIssuer;
use crate::application::{
    AuthenticateInput, AuthenticateUseCase, RegisterUseCase, TokenClaims,
};
use crate::domain::repository::{AccountRepository, EnrollmentRepository};
use crate::error::{IdentityError, IdentityResult};
use crate::presentation::dto::{
    AccountSummary, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    SessionStatusResponse,
};

/// Shared state for identity handlers
#[derive(Clone)]
pub struct IdentityAppState<R>
where
    R: AccountRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<IdentityConfig>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<IdentityAppState<R>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> IdentityResult<impl IntoResponse>
where
    R: AccountRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    // Body that does not match any role variant is a plain 400
    let Json(req) = payload.map_err(|e| IdentityError::Validation(e.body_text()))?;

    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());
    let output = use_case.execute(req.into_input()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: AccountSummary::from_parts(&output.account, &output.profile),
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
///
/// The token is delivered twice: in the response body and as a scoped
/// http-only session cookie whose Max-Age matches the token TTL.
pub async fn login<R>(
    State(state): State<IdentityAppState<R>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> IdentityResult<impl IntoResponse>
where
    R: AccountRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(|e| IdentityError::Validation(e.body_text()))?;

    let use_case = AuthenticateUseCase::new(state.repo.clone(), state.config.clone());
    let output = use_case
        .execute(AuthenticateInput {
            email: req.email,
            password: req.password,
            claimed_role: req.role,
        })
        .await?;

    let cookie = session_cookie(&state.config).build_set_cookie(&output.issued.token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            user: AccountSummary::from_parts(&output.account, &output.profile),
            token: output.issued.token,
            expires_at_ms: output.issued.expires_at_ms,
        }),
    ))
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/session
///
/// Stateless check: verifies the token from the cookie or Authorization
/// header. Always 200; the body says whether a valid session exists.
pub async fn session_status<R>(
    State(state): State<IdentityAppState<R>>,
    headers: HeaderMap,
) -> IdentityResult<Json<SessionStatusResponse>>
where
    R: AccountRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    let issuer = TokenIssuer::new(state.config.token_secret);

    let claims = extract_token(&headers, &state.config)
        .and_then(|token| issuer.verify(&token).ok());

    match claims {
        Some(claims) => Ok(Json(SessionStatusResponse {
            authenticated: true,
            account_id: Some(claims.account_id.to_string()),
            email: Some(claims.email),
            role: Some(claims.role),
            expires_at_ms: Some(claims.expires_at_ms),
        })),
        None => Ok(Json(SessionStatusResponse {
            authenticated: false,
            account_id: None,
            email: None,
            role: None,
            expires_at_ms: None,
        })),
    }
}

// ============================================================================
// Current Account (requires session)
// ============================================================================

/// GET /api/auth/me
///
/// Claims are injected by `require_session`. The account is re-read so a
/// deactivated account stops resolving even while its token is unexpired.
pub async fn me<R>(
    State(state): State<IdentityAppState<R>>,
    axum::Extension(claims): axum::Extension<TokenClaims>,
) -> IdentityResult<Json<AccountSummary>>
where
    R: AccountRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    let account = state
        .repo
        .find_by_id(&claims.account_id)
        .await?
        .filter(|account| account.can_login())
        .ok_or(IdentityError::InvalidCredentials)?;

    let profile = state
        .repo
        .find_profile(&account.account_id, account.role)
        .await?
        .ok_or_else(|| {
            IdentityError::Internal(format!(
                "Account {} has no {} profile",
                account.account_id, account.role
            ))
        })?;

    Ok(Json(AccountSummary::from_parts(&account, &profile)))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Pull the session token from the cookie, falling back to a Bearer header
pub(crate) fn extract_token(headers: &HeaderMap, config: &IdentityConfig) -> Option<String> {
    if let Some(token) = platform::cookie::extract_cookie(headers, &config.token_cookie_name) {
        return Some(token);
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
}

/// Session cookie scope for this deployment
pub(crate) fn session_cookie(config: &IdentityConfig) -> CookieConfig {
    CookieConfig {
        name: config.token_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs: Some(config.token_ttl.as_secs() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use platform::cookie::SameSite;

    #[test]
    fn test_session_cookie_attributes() {
        let config = IdentityConfig {
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            ..IdentityConfig::default()
        };

        let cookie = session_cookie(&config).build_set_cookie("tok");
        assert!(cookie.starts_with("auth_token=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        // Max-Age matches the 24h token TTL
        assert!(cookie.contains("Max-Age=86400"));
    }

    #[test]
    fn test_development_cookie_not_secure() {
        let config = IdentityConfig::development();
        let cookie = session_cookie(&config).build_set_cookie("tok");
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_extract_token_prefers_cookie() {
        let config = IdentityConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("auth_token=from-cookie"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        assert_eq!(
            extract_token(&headers, &config),
            Some("from-cookie".to_string())
        );
    }

    #[test]
    fn test_extract_token_bearer_fallback() {
        let config = IdentityConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        assert_eq!(
            extract_token(&headers, &config),
            Some("from-header".to_string())
        );

        assert_eq!(extract_token(&HeaderMap::new(), &config), None);
    }
}
