//! Bearer Token Issuance
//!
//! HS256 JWTs, two per login: a long-lived session token and a short-lived
//! trading token. The trading token gates order placement and is also
//! mirrored into the cache by the application layer; this module only
//! signs and verifies.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Token signing/verification errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Which of the two bearer tokens a JWT is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Session,
    Trading,
}

/// JWT claims carried by both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    /// Token kind; a session token never passes trading verification
    pub kind: TokenKind,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// The two tokens issued by one successful login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub session_token: String,
    pub trading_token: String,
    pub session_expires_at: DateTime<Utc>,
    pub trading_expires_at: DateTime<Utc>,
    issued_at: DateTime<Utc>,
}

impl TokenPair {
    /// Session token lifetime in milliseconds, as reported to clients
    pub fn expires_in_ms(&self) -> i64 {
        (self.session_expires_at - self.issued_at).num_milliseconds()
    }

    /// Trading token lifetime in milliseconds, as reported to clients
    pub fn trading_expires_in_ms(&self) -> i64 {
        (self.trading_expires_at - self.issued_at).num_milliseconds()
    }

    /// Trading token lifetime in whole seconds, used as the cache TTL
    pub fn trading_ttl_secs(&self) -> u64 {
        (self.trading_expires_at - self.issued_at).num_seconds().max(0) as u64
    }
}

/// Signs and verifies the dual bearer tokens
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    session_ttl: Duration,
    trading_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, session_ttl: Duration, trading_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl,
            trading_ttl,
        }
    }

    /// Issue both tokens for a user, anchored at "now"
    pub fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(user_id, Utc::now())
    }

    /// Issue both tokens anchored at an explicit instant
    pub fn issue_pair_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let session_expires_at = now + self.session_ttl;
        let trading_expires_at = now + self.trading_ttl;

        let session_token = self.sign(user_id, TokenKind::Session, now, session_expires_at)?;
        let trading_token = self.sign(user_id, TokenKind::Trading, now, trading_expires_at)?;

        Ok(TokenPair {
            session_token,
            trading_token,
            session_expires_at,
            trading_expires_at,
            issued_at: now,
        })
    }

    fn sign(
        &self,
        user_id: UserId,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.into_uuid(),
            kind,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and require it to be of the given kind.
    ///
    /// Expiry is checked with zero leeway; an expired token is reported
    /// distinctly from a malformed or wrong-kind one.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if data.claims.kind != expected {
            return Err(TokenError::Invalid);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            "test-secret",
            Duration::days(15),
            Duration::hours(24),
        )
    }

    #[test]
    fn test_issue_and_verify_both_kinds() {
        let issuer = issuer();
        let user_id = UserId::new();
        let pair = issuer.issue_pair(user_id).unwrap();

        let session = issuer.verify(&pair.session_token, TokenKind::Session).unwrap();
        assert_eq!(session.sub, user_id.into_uuid());
        assert_eq!(session.kind, TokenKind::Session);

        let trading = issuer.verify(&pair.trading_token, TokenKind::Trading).unwrap();
        assert_eq!(trading.kind, TokenKind::Trading);
    }

    #[test]
    fn test_kind_mismatch_is_invalid() {
        let issuer = issuer();
        let pair = issuer.issue_pair(UserId::new()).unwrap();

        assert!(matches!(
            issuer.verify(&pair.session_token, TokenKind::Trading),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(
            issuer.verify(&pair.trading_token, TokenKind::Session),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_expired_is_distinct_from_invalid() {
        let issuer = issuer();
        // Issued far enough in the past that even the 15-day token is dead
        let past = Utc::now() - Duration::days(30);
        let pair = issuer.issue_pair_at(UserId::new(), past).unwrap();

        assert!(matches!(
            issuer.verify(&pair.session_token, TokenKind::Session),
            Err(TokenError::Expired)
        ));
        assert!(matches!(
            issuer.verify("not-a-jwt", TokenKind::Session),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_trading_token_dies_before_session_token() {
        let issuer = issuer();
        // 25 hours old: past the 24h trading lifetime, well inside 15 days
        let past = Utc::now() - Duration::hours(25);
        let pair = issuer.issue_pair_at(UserId::new(), past).unwrap();

        assert!(matches!(
            issuer.verify(&pair.trading_token, TokenKind::Trading),
            Err(TokenError::Expired)
        ));
        assert!(issuer.verify(&pair.session_token, TokenKind::Session).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let pair = issuer().issue_pair(UserId::new()).unwrap();
        let other = TokenIssuer::new("other-secret", Duration::days(15), Duration::hours(24));

        assert!(matches!(
            other.verify(&pair.session_token, TokenKind::Session),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_client_facing_lifetimes() {
        let pair = issuer().issue_pair(UserId::new()).unwrap();
        assert_eq!(pair.expires_in_ms(), 15 * 24 * 60 * 60 * 1000);
        assert_eq!(pair.trading_expires_in_ms(), 24 * 60 * 60 * 1000);
        assert_eq!(pair.trading_ttl_secs(), 24 * 60 * 60);
    }
}
