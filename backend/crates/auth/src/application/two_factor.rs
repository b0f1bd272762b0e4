//! Two-Factor Enrollment and Toggle Use Cases
//!
//! Enroll switches the account onto a factor (material issued, still
//! disabled); toggle arms or disarms it after proving possession of a
//! current code.

use std::sync::Arc;

use kernel::id::UserId;
use platform::mailer::Mailer;

use crate::application::notify;
use crate::application::sign_up::EnrollmentMaterial;
use crate::domain::entity::user::User;
use crate::domain::repository::{CodeConsumption, UserRepository};
use crate::domain::value_object::{
    email_code::EmailChallenge,
    second_factor::{SecondFactorKind, generate_backup_codes},
    totp_secret::TotpSecret,
};
use crate::error::{AuthError, AuthResult};

/// Enroll input
pub struct EnrollInput {
    pub user_id: UserId,
    pub kind: SecondFactorKind,
}

/// Toggle input
pub struct ToggleInput {
    pub user_id: UserId,
    pub code: String,
    pub enable: bool,
}

/// Two-factor enrollment/toggle use case
pub struct TwoFactorUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    users: Arc<R>,
    mailer: Arc<M>,
}

impl<R, M> TwoFactorUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub fn new(users: Arc<R>, mailer: Arc<M>) -> Self {
        Self { users, mailer }
    }

    /// Switch the account onto a factor and hand back its enrollment
    /// material. The factor stays disabled until a toggle confirms a code.
    pub async fn enroll(&self, input: EnrollInput) -> AuthResult<EnrollmentMaterial> {
        let mut user = self
            .users
            .find_by_id(input.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let material = match input.kind {
            SecondFactorKind::Totp => {
                let secret = TotpSecret::generate(&user.email)?;
                user.enroll_totp(&secret);
                self.users.update(&user).await?;
                EnrollmentMaterial::Totp {
                    secret: secret.as_base32(),
                    otpauth_url: secret.otpauth_url(),
                    qr_code_base64: secret.qr_code_base64()?,
                    backup_codes: generate_backup_codes(),
                }
            }
            SecondFactorKind::Email => {
                user.enroll_email();
                let challenge = EmailChallenge::issue();
                let message = notify::two_factor_code_message(challenge.code());
                user.set_email_challenge(challenge);
                self.users.update(&user).await?;
                self.mailer.send(user.email.as_str(), &message).await?;
                EnrollmentMaterial::Email
            }
            SecondFactorKind::None => {
                return Err(AuthError::InvalidInput(
                    "type must be \"totp\" or \"email\"".to_string(),
                ));
            }
        };

        tracing::info!(user_id = %user.id, kind = %input.kind, "Second factor enrolled");

        Ok(material)
    }

    /// Arm or disarm the enrolled factor. Both directions require a valid
    /// current code; a wrong code is an authentication failure, not a
    /// validation one.
    pub async fn toggle(&self, input: ToggleInput) -> AuthResult<()> {
        let mut user = self
            .users
            .find_by_id(input.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.two_factor_kind == SecondFactorKind::None {
            return Err(AuthError::TwoFactorNotSetup);
        }

        self.verify_code(&mut user, &input.code).await?;

        user.set_two_factor_enabled(input.enable);
        self.users.update(&user).await?;

        tracing::info!(
            user_id = %user.id,
            enabled = input.enable,
            "Second factor toggled"
        );

        Ok(())
    }

    async fn verify_code(&self, user: &mut User, code: &str) -> AuthResult<()> {
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
