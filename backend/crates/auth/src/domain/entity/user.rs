//! User Entity
//!
//! The authenticated principal: credentials, second-factor enrollment, and
//! the brokerage profile captured at signup. Enrollment keeps exactly one
//! factor's material live at a time; switching kinds clears the other's.

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{
    email::Email, email_code::EmailChallenge, second_factor::SecondFactorKind,
    totp_secret::TotpSecret,
};
use crate::error::{AuthError, AuthResult};

/// Brokerage profile collected at signup. Every field except the defaults
/// is optional; compliance collects what it can.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub ssn_last4: Option<String>,
    pub employment_status: Option<String>,
    pub annual_income: Option<String>,
    pub net_worth: Option<String>,
    pub investment_experience: Option<String>,
    pub risk_tolerance: Option<String>,
    pub account_type: Option<String>,
}

impl Profile {
    /// Fill in the jurisdiction defaults applied to new accounts
    pub fn with_defaults(mut self) -> Self {
        self.country.get_or_insert_with(|| "US".to_string());
        self.account_type
            .get_or_insert_with(|| "individual".to_string());
        self
    }
}

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub profile: Profile,
    pub email_verified: bool,
    pub two_factor_kind: SecondFactorKind,
    pub two_factor_enabled: bool,
    /// Base32 TOTP secret; present iff `two_factor_kind` is `Totp`
    pub totp_secret: Option<String>,
    /// Pending emailed code; present only while a challenge is outstanding
    pub email_challenge: Option<EmailChallenge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new unverified user at signup
    pub fn new(email: Email, password_hash: HashedPassword, profile: Profile) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email,
            password_hash,
            profile: profile.with_defaults(),
            email_verified: false,
            two_factor_kind: SecondFactorKind::None,
            two_factor_enabled: false,
            totp_secret: None,
            email_challenge: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether login must be challenged with a second factor
    pub fn requires_second_factor(&self) -> bool {
        self.two_factor_enabled && self.two_factor_kind != SecondFactorKind::None
    }

    /// Reconstruct this user's TOTP verifier from the stored secret
    pub fn totp(&self) -> AuthResult<TotpSecret> {
        let encoded = self
            .totp_secret
            .as_deref()
            .ok_or(AuthError::TwoFactorNotSetup)?;
        TotpSecret::from_base32(encoded, &self.email).map_err(AuthError::from)
    }

    /// Enroll in TOTP: store the secret, drop any pending email challenge.
    /// Enrollment is not active until a code is confirmed via the toggle.
    pub fn enroll_totp(&mut self, secret: &TotpSecret) {
        self.two_factor_kind = SecondFactorKind::Totp;
        self.two_factor_enabled = false;
        self.totp_secret = Some(secret.as_base32());
        self.email_challenge = None;
        self.touch();
    }

    /// Enroll in emailed codes: drop any TOTP secret
    pub fn enroll_email(&mut self) {
        self.two_factor_kind = SecondFactorKind::Email;
        self.two_factor_enabled = false;
        self.totp_secret = None;
        self.email_challenge = None;
        self.touch();
    }

    /// Record a freshly issued email challenge
    pub fn set_email_challenge(&mut self, challenge: EmailChallenge) {
        self.email_challenge = Some(challenge);
        self.touch();
    }

    /// Mark the email address verified (signup verification)
    pub fn mark_verified(&mut self) {
        self.email_verified = true;
        self.touch();
    }

    /// Flip the enrolled factor on or off. Disabling clears the factor's
    /// material so a stale secret can never come back to life.
    pub fn set_two_factor_enabled(&mut self, enabled: bool) {
        self.two_factor_enabled = enabled;
        if !enabled {
            self.two_factor_kind = SecondFactorKind::None;
            self.totp_secret = None;
            self.email_challenge = None;
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            Email::new("user@example.com").unwrap(),
            HashedPassword::from_digest("$2b$12$abcdefghijklmnopqrstuv"),
            Profile::default(),
        )
    }

    #[test]
    fn test_new_user_defaults() {
        let user = test_user();
        assert!(!user.email_verified);
        assert!(!user.two_factor_enabled);
        assert_eq!(user.two_factor_kind, SecondFactorKind::None);
        assert_eq!(user.profile.country.as_deref(), Some("US"));
        assert_eq!(user.profile.account_type.as_deref(), Some("individual"));
        assert!(!user.requires_second_factor());
    }

    #[test]
    fn test_enroll_totp_clears_email_material() {
        let mut user = test_user();
        user.set_email_challenge(EmailChallenge::issue());

        let secret = TotpSecret::generate(&user.email).unwrap();
        user.enroll_totp(&secret);

        assert_eq!(user.two_factor_kind, SecondFactorKind::Totp);
        assert!(user.email_challenge.is_none());
        assert_eq!(user.totp_secret.as_deref(), Some(secret.as_base32().as_str()));
        // Enrollment alone does not arm the factor
        assert!(!user.requires_second_factor());
    }

    #[test]
    fn test_enroll_email_clears_totp_secret() {
        let mut user = test_user();
        let secret = TotpSecret::generate(&user.email).unwrap();
        user.enroll_totp(&secret);

        user.enroll_email();
        assert_eq!(user.two_factor_kind, SecondFactorKind::Email);
        assert!(user.totp_secret.is_none());
    }

    #[test]
    fn test_disable_clears_everything() {
        let mut user = test_user();
        let secret = TotpSecret::generate(&user.email).unwrap();
        user.enroll_totp(&secret);
        user.set_two_factor_enabled(true);
        assert!(user.requires_second_factor());

        user.set_two_factor_enabled(false);
        assert_eq!(user.two_factor_kind, SecondFactorKind::None);
        assert!(user.totp_secret.is_none());
        assert!(!user.requires_second_factor());
    }

    #[test]
    fn test_totp_requires_secret() {
        let user = test_user();
        assert!(matches!(user.totp(), Err(AuthError::TwoFactorNotSetup)));
    }
}
