//! Redis Trading-Token Cache
//!
//! Mirrors each trading token into Redis under two keys so both "who owns
//! this token" and "what is this user's current token" are O(1) lookups.
//! Both keys expire with the token itself.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use uuid::Uuid;

use crate::domain::repository::TokenCache;
use crate::error::{AuthError, AuthResult};
use kernel::id::UserId;

fn token_key(token: &str) -> String {
    format!("trading:{token}")
}

fn user_key(user_id: UserId) -> String {
    format!("user:{user_id}:trading")
}

/// Redis-backed trading token cache
#[derive(Clone)]
pub struct RedisTokenCache {
    conn: ConnectionManager,
}

impl RedisTokenCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

impl TokenCache for RedisTokenCache {
    async fn store_trading_token(
        &self,
        user_id: UserId,
        token: &str,
        ttl_secs: u64,
    ) -> AuthResult<()> {
        let mut conn = self.conn.clone();

        let () = conn
            .set_ex(token_key(token), user_id.to_string(), ttl_secs)
            .await?;
        let () = conn.set_ex(user_key(user_id), token, ttl_secs).await?;

        tracing::debug!(user_id = %user_id, ttl_secs, "Trading token cached");

        Ok(())
    }

    async fn user_for_trading_token(&self, token: &str) -> AuthResult<Option<UserId>> {
        let mut conn = self.conn.clone();

        let value: Option<String> = conn.get(token_key(token)).await?;
        match value {
            None => Ok(None),
            Some(raw) => {
                let uuid = Uuid::parse_str(&raw).map_err(|_| {
                    AuthError::Internal("Malformed cache entry for trading token".to_string())
                })?;
                Ok(Some(UserId::from_uuid(uuid)))
            }
        }
    }

    async fn trading_token_for_user(&self, user_id: UserId) -> AuthResult<Option<String>> {
        let mut conn = self.conn.clone();

        let value: Option<String> = conn.get(user_key(user_id)).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_schema() {
        let user_id = UserId::new();
        assert_eq!(token_key("abc.def"), "trading:abc.def");
        assert_eq!(user_key(user_id), format!("user:{}:trading", user_id));
    }
}
