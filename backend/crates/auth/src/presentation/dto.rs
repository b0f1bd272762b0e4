//! Data Transfer Objects
//!
//! Request/response types for the HTTP API. Field names are camelCase on
//! the wire. `UserView` is the only shape a principal ever leaves in:
//! credentials, second-factor material, and the SSN fragment never
//! serialize.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::sign_up::EnrollmentMaterial;
use crate::domain::entity::user::User;
use crate::domain::value_object::second_factor::SecondFactorKind;

fn default_two_factor_kind() -> SecondFactorKind {
    SecondFactorKind::Email
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub ssn_last4: Option<String>,
    #[serde(default)]
    pub employment_status: Option<String>,
    #[serde(default)]
    pub annual_income: Option<String>,
    #[serde(default)]
    pub net_worth: Option<String>,
    #[serde(default)]
    pub investment_experience: Option<String>,
    #[serde(default)]
    pub risk_tolerance: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default = "default_two_factor_kind")]
    pub two_factor_type: SecondFactorKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub two_factor_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySignUpRequest {
    pub user_id: Uuid,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: SecondFactorKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorEnrollRequest {
    pub user_id: Uuid,
    #[serde(rename = "type", default = "default_two_factor_kind")]
    pub kind: SecondFactorKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorToggleRequest {
    pub user_id: Uuid,
    pub code: String,
    pub enable: bool,
}

// ============================================================================
// Responses
// ============================================================================

/// Sanitized principal view. Constructed only through `From<&User>`, which
/// copies nothing sensitive.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    pub account_type: Option<String>,
    pub is_verified: bool,
    #[serde(rename = "is2faEnabled")]
    pub is_2fa_enabled: bool,
    pub two_factor_type: SecondFactorKind,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.into_uuid(),
            email: user.email.as_str().to_string(),
            first_name: user.profile.first_name.clone(),
            last_name: user.profile.last_name.clone(),
            country: user.profile.country.clone(),
            account_type: user.profile.account_type.clone(),
            is_verified: user.email_verified,
            is_2fa_enabled: user.two_factor_enabled,
            two_factor_type: user.two_factor_kind,
            created_at: user.created_at,
        }
    }
}

/// Second-factor enrollment material, tagged by kind
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TwoFactorSetupView {
    #[serde(rename = "totp")]
    #[serde(rename_all = "camelCase")]
    Totp {
        secret: String,
        otpauth_url: String,
        qr_code: String,
        backup_codes: Vec<String>,
    },
    #[serde(rename = "email")]
    #[serde(rename_all = "camelCase")]
    Email { code_sent: bool },
}

impl From<EnrollmentMaterial> for TwoFactorSetupView {
    fn from(material: EnrollmentMaterial) -> Self {
        match material {
            EnrollmentMaterial::Totp {
                secret,
                otpauth_url,
                qr_code_base64,
                backup_codes,
            } => TwoFactorSetupView::Totp {
                secret,
                otpauth_url,
                qr_code: qr_code_base64,
                backup_codes,
            },
            EnrollmentMaterial::Email => TwoFactorSetupView::Email { code_sent: true },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub user_id: Uuid,
    pub user: UserView,
    pub requires_verification: bool,
    pub two_factor_setup: TwoFactorSetupView,
    pub message: String,
}

/// Token pair plus the principal it belongs to; shared by login and
/// verify-signup
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedResponse {
    pub user: UserView,
    pub session_token: String,
    pub trading_token: String,
    /// Session token lifetime in milliseconds
    pub expires_in: i64,
    /// Trading token lifetime in milliseconds
    pub trading_expires_in: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeResponse {
    #[serde(rename = "type")]
    pub kind: SecondFactorKind,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub is_2fa_enabled: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::Profile;
    use crate::domain::value_object::{email::Email, email_code::EmailChallenge};
    use platform::password::HashedPassword;

    fn enrolled_user() -> User {
        let mut user = User::new(
            Email::new("user@example.com").unwrap(),
            HashedPassword::from_digest("$2b$12$abcdefghijklmnopqrstuv"),
            Profile {
                ssn_last4: Some("1234".to_string()),
                ..Profile::default()
            },
        );
        user.enroll_email();
        user.set_email_challenge(EmailChallenge::issue());
        user
    }

    #[test]
    fn test_user_view_never_leaks_secrets() {
        let user = enrolled_user();

        let rendered = serde_json::to_value(UserView::from(&user)).unwrap();
        let keys: Vec<&String> = rendered.as_object().unwrap().keys().collect();
        assert!(!keys.iter().any(|k| k.to_lowercase().contains("password")));
        assert!(!keys.iter().any(|k| k.to_lowercase().contains("secret")));
        assert!(!keys.iter().any(|k| k.to_lowercase().contains("ssn")));
        assert!(!keys.iter().any(|k| k.to_lowercase().contains("code")));

        let text = rendered.to_string();
        assert!(!text.contains("$2b$12$"));
    }

    #[test]
    fn test_signup_request_defaults_to_email_kind() {
        let req: SignUpRequest = serde_json::from_str(
            r#"{"email":"a@b.com","password":"Secret1!x"}"#,
        )
        .unwrap();
        assert_eq!(req.two_factor_type, SecondFactorKind::Email);
    }

    #[test]
    fn test_setup_view_tagging() {
        let view = TwoFactorSetupView::Email { code_sent: true };
        let rendered = serde_json::to_value(&view).unwrap();
        assert_eq!(rendered["type"], "email");
        assert_eq!(rendered["codeSent"], true);
    }
}
