//! Repository Traits
//!
//! Persistence seams for the auth domain. Implementations live in `infra/`;
//! tests swap in in-memory fakes.

use kernel::id::UserId;

use crate::domain::entity::session::SessionRecord;
use crate::domain::entity::user::User;
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// Outcome of the atomic email-code consumption.
///
/// The code is cleared whenever a matching row exists, so a code that was
/// expired when submitted still cannot be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeConsumption {
    /// Code matched and was inside its validity window
    Accepted,
    /// Code matched but its window had passed; it was still cleared
    Expired,
    /// No pending code matched; nothing was changed
    NoMatch,
}

/// User persistence
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user. A duplicate email surfaces as `EmailTaken`.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Exact-match lookup by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>>;

    /// Persist the user's current 2FA enrollment, challenge, and
    /// verification state
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Atomically check a submitted email code against the user's pending
    /// one and clear it in the same statement
    async fn consume_email_code(&self, id: UserId, code: &str) -> AuthResult<CodeConsumption>;
}

/// Issued-session persistence
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Record one successful login
    async fn create(&self, record: &SessionRecord) -> AuthResult<()>;
}

/// Fast-path cache for trading tokens.
///
/// Two entries per login, both expiring with the token: token -> user for
/// bearer checks, user -> token for "current trading token" lookups.
#[trait_variant::make(TokenCache: Send)]
pub trait LocalTokenCache {
    async fn store_trading_token(
        &self,
        user_id: UserId,
        token: &str,
        ttl_secs: u64,
    ) -> AuthResult<()>;

    async fn user_for_trading_token(&self, token: &str) -> AuthResult<Option<UserId>>;

    async fn trading_token_for_user(&self, user_id: UserId) -> AuthResult<Option<String>>;
}
