//! Session Token Issuance and Verification
//!
//! Self-contained signed tokens: no server-side session row exists, the
//! token itself carries the claims and an absolute expiry.
//!
//! Format: `base64url(JSON claims) "." base64url(HMAC-SHA256(payload))`,
//! signed with the process-lifetime symmetric secret from
//! [`IdentityConfig`](crate::application::config::IdentityConfig).
//! The signature is checked before the payload is parsed or the expiry
//! consulted.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::value_object::{account_id::AccountId, email::Email, role::Role};
use crate::error::{IdentityError, IdentityResult};

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub account_id: AccountId,
    pub email: String,
    pub role: Role,
    /// Absolute expiry (Unix timestamp ms)
    pub expires_at_ms: i64,
}

/// Wire form of the claims payload
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimsWire {
    account_id: Uuid,
    email: String,
    role: Role,
    expires_at_ms: i64,
}

/// A freshly issued token plus its expiry, for the response body and cookie
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at_ms: i64,
}

/// Stateless token issuer/verifier
#[derive(Clone)]
pub struct TokenIssuer {
    secret: [u8; 32],
}

impl TokenIssuer {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    /// Issue a signed token embedding the claims and an absolute expiry
    pub fn issue(
        &self,
        account_id: &AccountId,
        email: &Email,
        role: Role,
        ttl: Duration,
    ) -> IdentityResult<IssuedToken> {
        let expires_at_ms = Utc::now().timestamp_millis() + ttl.as_millis() as i64;

        let wire = ClaimsWire {
            account_id: *account_id.as_uuid(),
            email: email.as_str().to_string(),
            role,
            expires_at_ms,
        };

        let payload = serde_json::to_vec(&wire)
            .map_err(|e| IdentityError::Internal(format!("Claims serialization failed: {e}")))?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(payload_b64.as_bytes());
        let signature = mac.finalize().into_bytes();

        let token = format!("{}.{}", payload_b64, URL_SAFE_NO_PAD.encode(signature));

        Ok(IssuedToken {
            token,
            expires_at_ms,
        })
    }

    /// Verify a token and return its claims
    ///
    /// Signature first (constant-time via `Mac::verify_slice`), then
    /// structure, then expiry.
    pub fn verify(&self, token: &str) -> IdentityResult<TokenClaims> {
        let (payload_b64, signature_b64) = token
            .split_once('.')
            .ok_or(IdentityError::TokenMalformed)?;
        if payload_b64.is_empty() || signature_b64.contains('.') {
            return Err(IdentityError::TokenMalformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| IdentityError::TokenMalformed)?;

        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| IdentityError::TokenBadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| IdentityError::TokenMalformed)?;
        let wire: ClaimsWire =
            serde_json::from_slice(&payload).map_err(|_| IdentityError::TokenMalformed)?;

        if Utc::now().timestamp_millis() >= wire.expires_at_ms {
            return Err(IdentityError::TokenExpired);
        }

        Ok(TokenClaims {
            account_id: AccountId::from_uuid(wire.account_id),
            email: wire.email,
            role: wire.role,
            expires_at_ms: wire.expires_at_ms,
        })
    }
}
