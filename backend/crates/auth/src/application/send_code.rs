//! Send Code Use Case
//!
//! Explicit resend of an email second-factor code. Only email-kind
//! accounts qualify; TOTP codes come from the authenticator app.

use std::sync::Arc;

use platform::mailer::Mailer;

use crate::application::notify;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, email_code::EmailChallenge, second_factor::SecondFactorKind};
use crate::error::{AuthError, AuthResult};

/// Send code use case
pub struct SendCodeUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    users: Arc<R>,
    mailer: Arc<M>,
}

impl<R, M> SendCodeUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub fn new(users: Arc<R>, mailer: Arc<M>) -> Self {
        Self { users, mailer }
    }

    pub async fn execute(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email)?;

        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.two_factor_kind != SecondFactorKind::Email {
            return Err(AuthError::ResendNotSupported);
        }

        // Overwrites any unconsumed prior code
        let challenge = EmailChallenge::issue();
        let message = notify::two_factor_code_message(challenge.code());
        user.set_email_challenge(challenge);
        self.users.update(&user).await?;

        self.mailer.send(user.email.as_str(), &message).await?;

        tracing::info!(user_id = %user.id, "2FA code sent");

        Ok(())
    }
}
