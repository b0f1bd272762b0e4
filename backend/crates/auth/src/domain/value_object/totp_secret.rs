//! TOTP Shared Secret
//!
//! Wraps the base32 secret shared with the user's authenticator app and the
//! RFC 6238 verification parameters. Codes are accepted within a two-step
//! skew (±60 seconds) to absorb clock drift.

use totp_rs::{Algorithm, Secret, TOTP};

use kernel::error::app_error::{AppError, AppResult};

use super::email::Email;

/// Code length shown by authenticator apps
const TOTP_DIGITS: usize = 6;

/// Code rotation period in seconds
const TOTP_STEP: u64 = 30;

/// Accepted steps either side of "now" (2 steps = ±60s)
const TOTP_SKEW: u8 = 2;

/// Issuer name shown in authenticator apps
const TOTP_ISSUER: &str = "StockExchange";

/// A user's TOTP shared secret plus verification parameters
#[derive(Clone)]
pub struct TotpSecret {
    totp: TOTP,
}

impl TotpSecret {
    /// Generate a fresh secret for enrollment, labeled with the user's email
    pub fn generate(account: &Email) -> AppResult<Self> {
        let secret = Secret::generate_secret();
        Self::build(secret, account.as_str())
    }

    /// Reconstruct from the base32 secret stored in the database
    pub fn from_base32(encoded: &str, account: &Email) -> AppResult<Self> {
        let secret = Secret::Encoded(encoded.to_string());
        Self::build(secret, account.as_str())
    }

    fn build(secret: Secret, account: &str) -> AppResult<Self> {
        let bytes = secret
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {:?}", e)))?;

        let totp = TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            bytes,
            Some(TOTP_ISSUER.to_string()),
            account.to_string(),
        )
        .map_err(|e| AppError::internal(format!("Failed to build TOTP: {}", e)))?;

        Ok(Self { totp })
    }

    /// Base32 representation for storage
    pub fn as_base32(&self) -> String {
        self.totp.get_secret_base32()
    }

    /// Check a code against the current time
    pub fn verify(&self, code: &str) -> bool {
        self.totp.check_current(code).unwrap_or(false)
    }

    /// Check a code against an explicit unix timestamp
    pub fn check_at(&self, code: &str, unix_time: u64) -> bool {
        self.totp.check(code, unix_time)
    }

    /// Current code for the given timestamp (test support)
    #[cfg(test)]
    pub fn code_at(&self, unix_time: u64) -> String {
        self.totp.generate(unix_time)
    }

    /// otpauth:// URL for manual entry
    pub fn otpauth_url(&self) -> String {
        self.totp.get_url()
    }

    /// QR code of the otpauth URL, as a base64-encoded PNG
    pub fn qr_code_base64(&self) -> AppResult<String> {
        self.totp
            .get_qr_base64()
            .map_err(|e| AppError::internal(format!("Failed to render QR code: {}", e)))
    }
}

impl std::fmt::Debug for TotpSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TotpSecret").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Email {
        Email::new("user@example.com").unwrap()
    }

    #[test]
    fn test_generate_and_restore() {
        let secret = TotpSecret::generate(&account()).unwrap();
        let encoded = secret.as_base32();
        let restored = TotpSecret::from_base32(&encoded, &account()).unwrap();
        assert_eq!(encoded, restored.as_base32());
    }

    #[test]
    fn test_code_accepted_within_skew() {
        let secret = TotpSecret::generate(&account()).unwrap();
        let now = 1_700_000_000u64;
        let code = secret.code_at(now);

        assert!(secret.check_at(&code, now));
        // Two steps either side of the code's window still accept
        assert!(secret.check_at(&code, now + 30));
        assert!(secret.check_at(&code, now + 60));
        assert!(secret.check_at(&code, now - 60));
    }

    #[test]
    fn test_code_rejected_outside_skew() {
        let secret = TotpSecret::generate(&account()).unwrap();
        let now = 1_700_000_000u64;
        let code = secret.code_at(now);

        assert!(!secret.check_at(&code, now + 91));
    }

    #[test]
    fn test_wrong_code_rejected() {
        let secret = TotpSecret::generate(&account()).unwrap();
        let now = 1_700_000_000u64;
        let code = secret.code_at(now);
        let wrong = if code == "000000" { "000001" } else { "000000" };

        assert!(!secret.check_at(wrong, now));
    }

    #[test]
    fn test_otpauth_url_carries_issuer() {
        let secret = TotpSecret::generate(&account()).unwrap();
        let url = secret.otpauth_url();
        assert!(url.starts_with("otpauth://totp/"));
        assert!(url.contains("StockExchange"));
    }

    #[test]
    fn test_invalid_base32_rejected() {
        assert!(TotpSecret::from_base32("not base32!!", &account()).is_err());
    }
}
