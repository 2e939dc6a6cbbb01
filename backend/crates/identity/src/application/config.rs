//! Application Configuration
//!
//! Configuration for the identity application layer. Constructed once at
//! process start and passed in as an immutable value; nothing here is read
//! from mutable process-wide state, and the signing secret is fixed for the
//! process lifetime (no runtime rotation).

use std::time::Duration;

pub use platform::cookie::SameSite;
pub use platform::password::HashingCost;

/// Identity application configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Session token cookie name
    pub token_cookie_name: String,
    /// Token secret key for HMAC signing (32 bytes)
    pub token_secret: [u8; 32],
    /// Token TTL (24 hours)
    pub token_ttl: Duration,
    /// Whether to require Secure cookie (on in production deployments)
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Argon2id cost parameters
    pub hashing_cost: HashingCost,
    /// Upper bound on any single store transaction
    pub store_timeout: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_cookie_name: "auth_token".to_string(),
            token_secret: [0u8; 32],
            token_ttl: Duration::from_secs(24 * 3600), // 24 hours
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            password_pepper: None,
            hashing_cost: HashingCost::default(),
            store_timeout: Duration::from_secs(5),
        }
    }
}

impl IdentityConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie, cheap hashing)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Get token TTL in milliseconds
    pub fn token_ttl_ms(&self) -> i64 {
        self.token_ttl.as_millis() as i64
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_24h() {
        let config = IdentityConfig::default();
        assert_eq!(config.token_ttl_ms(), 24 * 3600 * 1000);
        assert_eq!(config.cookie_same_site, SameSite::Strict);
        assert!(config.cookie_secure);
    }

    #[test]
    fn test_development_config() {
        let config = IdentityConfig::development();
        assert!(!config.cookie_secure);
        // Random secret, not the zero default
        assert_ne!(config.token_secret, [0u8; 32]);
    }
}
