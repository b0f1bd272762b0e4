//! Emailed Verification Code
//!
//! A pending 6-digit code with its expiry instant. Codes live for ten
//! minutes and are single-use; the repository clears them atomically when
//! consumed.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Lifetime of an emailed code
pub const EMAIL_CODE_TTL_MINUTES: i64 = 10;

/// A pending emailed second-factor code
#[derive(Clone, PartialEq, Eq)]
pub struct EmailChallenge {
    code: String,
    expires_at: DateTime<Utc>,
}

impl EmailChallenge {
    /// Issue a fresh 6-digit challenge expiring ten minutes from now
    pub fn issue() -> Self {
        Self::issue_at(Utc::now())
    }

    /// Issue a challenge anchored at an explicit instant
    pub fn issue_at(now: DateTime<Utc>) -> Self {
        Self {
            code: Self::generate_code(),
            expires_at: now + Duration::minutes(EMAIL_CODE_TTL_MINUTES),
        }
    }

    /// Reconstruct from stored columns
    pub fn from_db(code: String, expires_at: DateTime<Utc>) -> Self {
        Self { code, expires_at }
    }

    /// Random 6-digit code, uniform over 100000..=999999 so it never needs
    /// zero-padding
    fn generate_code() -> String {
        let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
        code.to_string()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Constant-time comparison against a submitted code
    pub fn matches(&self, submitted: &str) -> bool {
        platform::crypto::constant_time_eq(self.code.as_bytes(), submitted.as_bytes())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl std::fmt::Debug for EmailChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailChallenge")
            .field("code", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_six_digits() {
        for _ in 0..100 {
            let challenge = EmailChallenge::issue();
            assert_eq!(challenge.code().len(), 6);
            assert!(challenge.code().chars().all(|c| c.is_ascii_digit()));
            assert!(!challenge.code().starts_with('0'));
        }
    }

    #[test]
    fn test_expiry_window() {
        let now = Utc::now();
        let challenge = EmailChallenge::issue_at(now);

        assert!(!challenge.is_expired(now));
        assert!(!challenge.is_expired(now + Duration::minutes(9)));
        assert!(challenge.is_expired(now + Duration::minutes(10) + Duration::seconds(1)));
    }

    #[test]
    fn test_matches() {
        let challenge = EmailChallenge::from_db("123456".to_string(), Utc::now());
        assert!(challenge.matches("123456"));
        assert!(!challenge.matches("654321"));
        assert!(!challenge.matches("12345"));
    }

    #[test]
    fn test_debug_redacts_code() {
        let challenge = EmailChallenge::issue();
        let rendered = format!("{:?}", challenge);
        assert!(!rendered.contains(challenge.code()));
        assert!(rendered.contains("[REDACTED]"));
    }
}
