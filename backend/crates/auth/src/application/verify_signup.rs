//! Verify Signup Use Case
//!
//! Confirms the second factor enrolled at signup. Success flips the account
//! to verified+enabled and issues the first token pair; failure changes
//! nothing.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::session::establish_session;
use crate::domain::entity::user::User;
use crate::domain::repository::{CodeConsumption, SessionRepository, TokenCache, UserRepository};
use crate::domain::token::{TokenIssuer, TokenPair};
use crate::domain::value_object::second_factor::SecondFactorKind;
use crate::error::{AuthError, AuthResult};

/// Verify signup input
pub struct VerifySignUpInput {
    pub user_id: UserId,
    pub code: String,
    /// Kind the client claims to be verifying; must match the enrollment
    pub kind: SecondFactorKind,
}

/// Verify signup output
#[derive(Debug)]
pub struct VerifySignUpOutput {
    pub user: User,
    pub tokens: TokenPair,
}

/// Verify signup use case
pub struct VerifySignUpUseCase<R, S, C>
where
    R: UserRepository,
    S: SessionRepository,
    C: TokenCache,
{
    users: Arc<R>,
    sessions: Arc<S>,
    cache: Arc<C>,
    tokens: Arc<TokenIssuer>,
}

impl<R, S, C> VerifySignUpUseCase<R, S, C>
where
    R: UserRepository,
    S: SessionRepository,
    C: TokenCache,
{
    pub fn new(users: Arc<R>, sessions: Arc<S>, cache: Arc<C>, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            users,
            sessions,
            cache,
            tokens,
        }
    }

    pub async fn execute(&self, input: VerifySignUpInput) -> AuthResult<VerifySignUpOutput> {
        let mut user = self
            .users
            .find_by_id(input.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if input.kind == SecondFactorKind::None || input.kind != user.two_factor_kind {
            return Err(AuthError::TwoFactorNotSetup);
        }

        match input.kind {
            SecondFactorKind::Totp => {
                if !user.totp()?.verify(&input.code) {
                    return Err(AuthError::InvalidTwoFactorCode);
                }
            }
            SecondFactorKind::Email => {
                match self.users.consume_email_code(user.id, &input.code).await? {
                    CodeConsumption::Accepted => {
                        user.email_challenge = None;
                    }
                    CodeConsumption::Expired => return Err(AuthError::TwoFactorCodeExpired),
                    CodeConsumption::NoMatch => return Err(AuthError::InvalidTwoFactorCode),
                }
            }
            SecondFactorKind::None => unreachable!(),
        }

        user.mark_verified();
        user.set_two_factor_enabled(true);
        self.users.update(&user).await?;

        let tokens =
            establish_session(&*self.sessions, &*self.cache, &self.tokens, user.id).await?;

        tracing::info!(user_id = %user.id, "Signup verified");

        Ok(VerifySignUpOutput { user, tokens })
    }
}
