//! Session Entity
//!
//! Durable record of one successful login: the dual bearer tokens issued
//! and their expiry instants. One row per login, never updated.

use chrono::{DateTime, Utc};
use kernel::id::{SessionId, UserId};

use crate::domain::token::TokenPair;

/// A persisted login session
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: SessionId,
    pub user_id: UserId,
    pub session_token: String,
    pub trading_token: String,
    pub session_expires_at: DateTime<Utc>,
    pub trading_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Record a freshly issued token pair for a user
    pub fn new(user_id: UserId, tokens: &TokenPair) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            session_token: tokens.session_token.clone(),
            trading_token: tokens.trading_token.clone(),
            session_expires_at: tokens.session_expires_at,
            trading_expires_at: tokens.trading_expires_at,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::AuthConfig;

    #[test]
    fn test_record_mirrors_token_pair() {
        let config = AuthConfig::development();
        let issuer = config.token_issuer();
        let user_id = UserId::new();
        let pair = issuer.issue_pair(user_id).unwrap();

        let record = SessionRecord::new(user_id, &pair);
        assert_eq!(record.user_id, user_id);
        assert_eq!(record.session_token, pair.session_token);
        assert_eq!(record.trading_token, pair.trading_token);
        assert!(record.trading_expires_at < record.session_expires_at);
    }
}
