//! Application Configuration
//!
//! Configuration for the Auth application layer.

use chrono::Duration;

use crate::domain::token::TokenIssuer;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for both token kinds
    pub jwt_secret: String,
    /// Session token lifetime (15 days)
    pub session_ttl: Duration,
    /// Trading token lifetime (24 hours)
    pub trading_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            session_ttl: Duration::days(15),
            trading_ttl: Duration::hours(24),
        }
    }
}

impl AuthConfig {
    /// Create config with an explicit secret
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ..Default::default()
        }
    }

    /// Create config with a random secret (for development and tests)
    pub fn development() -> Self {
        use rand::Rng;
        let secret: String = rand::thread_rng()
            .sample_iter(rand::distributions::Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();
        Self::new(secret)
    }

    /// Build the token issuer for this configuration
    pub fn token_issuer(&self) -> TokenIssuer {
        TokenIssuer::new(&self.jwt_secret, self.session_ttl, self.trading_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.session_ttl, Duration::days(15));
        assert_eq!(config.trading_ttl, Duration::hours(24));
    }

    #[test]
    fn test_development_secret_is_random() {
        let a = AuthConfig::development();
        let b = AuthConfig::development();
        assert_ne!(a.jwt_secret, b.jwt_secret);
        assert_eq!(a.jwt_secret.len(), 48);
    }
}
