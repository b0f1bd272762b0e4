//! Sign In Use Case
//!
//! Verifies the password, then the enrolled second factor, then issues the
//! dual token pair. Wrong email and wrong password share one error path so
//! the response cannot be used to enumerate accounts.

use std::sync::Arc;

use platform::mailer::Mailer;
use platform::password::ClearTextPassword;

use crate::application::notify;
use crate::application::session::establish_session;
use crate::domain::entity::user::User;
use crate::domain::repository::{CodeConsumption, SessionRepository, TokenCache, UserRepository};
use crate::domain::token::{TokenIssuer, TokenPair};
use crate::domain::value_object::{email::Email, email_code::EmailChallenge, second_factor::SecondFactorKind};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
    /// Second-factor code, when the client already has one
    pub two_factor_code: Option<String>,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub user: User,
    pub tokens: TokenPair,
}

/// Sign in use case
pub struct SignInUseCase<R, S, C, M>
where
    R: UserRepository,
    S: SessionRepository,
    C: TokenCache,
    M: Mailer,
{
    users: Arc<R>,
    sessions: Arc<S>,
    cache: Arc<C>,
    mailer: Arc<M>,
    tokens: Arc<TokenIssuer>,
}

impl<R, S, C, M> SignInUseCase<R, S, C, M>
where
    R: UserRepository,
    S: SessionRepository,
    C: TokenCache,
    M: Mailer,
{
    pub fn new(
        users: Arc<R>,
        sessions: Arc<S>,
        cache: Arc<C>,
        mailer: Arc<M>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            users,
            sessions,
            cache,
            mailer,
            tokens,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password = ClearTextPassword::new(input.password);
        if !user.password_hash.verify(&password) {
            tracing::warn!(user_id = %user.id, "Password verification failed");
            return Err(AuthError::InvalidCredentials);
        }

        if user.requires_second_factor() {
            match &input.two_factor_code {
                None => return self.challenge(&mut user).await,
                Some(code) => self.verify_second_factor(&mut user, code).await?,
            }
        }

        let tokens =
            establish_session(&*self.sessions, &*self.cache, &self.tokens, user.id).await?;

        tracing::info!(user_id = %user.id, "User signed in");

        Ok(SignInOutput { user, tokens })
    }

    /// No code was submitted: answer with a challenge instead of tokens.
    /// For email-kind accounts a fresh code is issued and sent first.
    async fn challenge(&self, user: &mut User) -> AuthResult<SignInOutput> {
        let kind = user.two_factor_kind;
        let code_sent = if kind == SecondFactorKind::Email {
            let challenge = EmailChallenge::issue();
            let message = notify::two_factor_code_message(challenge.code());
            // A fresh challenge supersedes any unconsumed prior code
            user.set_email_challenge(challenge);
            self.users.update(user).await?;
            self.mailer.send(user.email.as_str(), &message).await?;
            true
        } else {
            false
        };

        Err(AuthError::TwoFactorRequired { kind, code_sent })
    }

    async fn verify_second_factor(&self, user: &mut User, code: &str) -> AuthResult<()> {
        match user.two_factor_kind {
            SecondFactorKind::Totp => {
                if !user.totp()?.verify(code) {
                    return Err(AuthError::InvalidTwoFactorCode);
                }
                Ok(())
            }
            SecondFactorKind::Email => {
                match self.users.consume_email_code(user.id, code).await? {
                    CodeConsumption::Accepted => {
                        user.email_challenge = None;
                        Ok(())
                    }
                    CodeConsumption::Expired => Err(AuthError::TwoFactorCodeExpired),
                    CodeConsumption::NoMatch => Err(AuthError::InvalidTwoFactorCode),
                }
            }
            SecondFactorKind::None => Err(AuthError::TwoFactorNotSetup),
        }
    }
}
