//! Sign Up Use Case
//!
//! Creates an unverified account and starts second-factor enrollment.
//! Signup never issues tokens; those come from verify-signup or login.

use std::sync::Arc;

use platform::mailer::Mailer;
use platform::password::{ClearTextPassword, validate_strength};

use crate::application::notify;
use crate::domain::entity::user::{Profile, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    email_code::EmailChallenge,
    second_factor::{SecondFactorKind, generate_backup_codes},
    totp_secret::TotpSecret,
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub profile: Profile,
    /// Requested second-factor kind; `None` is not a valid request here
    pub two_factor_kind: SecondFactorKind,
}

/// What the client needs to complete enrollment
#[derive(Debug)]
pub enum EnrollmentMaterial {
    /// Scan-or-type material for an authenticator app
    Totp {
        secret: String,
        otpauth_url: String,
        qr_code_base64: String,
        backup_codes: Vec<String>,
    },
    /// A code was emailed to the signup address
    Email,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub user: User,
    pub enrollment: EnrollmentMaterial,
}

/// Sign up use case
pub struct SignUpUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    users: Arc<R>,
    mailer: Arc<M>,
}

impl<R, M> SignUpUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub fn new(users: Arc<R>, mailer: Arc<M>) -> Self {
        Self { users, mailer }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        if input.two_factor_kind == SecondFactorKind::None {
            return Err(AuthError::InvalidInput(
                "twoFactorType must be \"totp\" or \"email\"".to_string(),
            ));
        }

        let email = Email::new(&input.email)?;

        validate_strength(&input.password).map_err(AuthError::PasswordPolicy)?;

        let password = ClearTextPassword::new(input.password);
        let password_hash = password
            .hash()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let mut user = User::new(email, password_hash, input.profile);

        let enrollment = match input.two_factor_kind {
            SecondFactorKind::Totp => {
                let secret = TotpSecret::generate(&user.email)?;
                user.enroll_totp(&secret);
                EnrollmentMaterial::Totp {
                    secret: secret.as_base32(),
                    otpauth_url: secret.otpauth_url(),
                    qr_code_base64: secret.qr_code_base64()?,
                    backup_codes: generate_backup_codes(),
                }
            }
            SecondFactorKind::Email => {
                user.enroll_email();
                user.set_email_challenge(EmailChallenge::issue());
                EnrollmentMaterial::Email
            }
            SecondFactorKind::None => unreachable!(),
        };

        // Duplicate email surfaces here via the unique constraint
        self.users.create(&user).await?;

        // The row is committed before the send; if delivery fails the
        // account stays unverified until an explicit resend succeeds.
        if let Some(challenge) = &user.email_challenge {
            let message = notify::signup_verification_message(challenge.code());
            self.mailer.send(user.email.as_str(), &message).await?;
        }

        tracing::info!(
            user_id = %user.id,
            two_factor = %user.two_factor_kind,
            "User signed up"
        );

        Ok(SignUpOutput { user, enrollment })
    }
}
