//! Session Establishment
//!
//! The shared final step of login and signup verification: mint the token
//! pair, persist the session row, and mirror the trading token into the
//! cache under both key shapes.

use kernel::id::UserId;

use crate::domain::entity::session::SessionRecord;
use crate::domain::repository::{SessionRepository, TokenCache};
use crate::domain::token::{TokenIssuer, TokenPair};
use crate::error::AuthResult;

pub async fn establish_session<S, C>(
    sessions: &S,
    cache: &C,
    issuer: &TokenIssuer,
    user_id: UserId,
) -> AuthResult<TokenPair>
where
    S: SessionRepository,
    C: TokenCache,
{
    let pair = issuer.issue_pair(user_id)?;

    let record = SessionRecord::new(user_id, &pair);
    sessions.create(&record).await?;

    cache
        .store_trading_token(user_id, &pair.trading_token, pair.trading_ttl_secs())
        .await?;

    tracing::info!(
        user_id = %user_id,
        session_id = %record.id,
        "Session established"
    );

    Ok(pair)
}
