//! Second-Factor Kind
//!
//! Closed set of second-factor mechanisms. Everything that branches on the
//! mechanism matches on this enum, so adding a new kind is a compile-time
//! checklist rather than a string comparison audit.

use serde::{Deserialize, Serialize};

use kernel::error::app_error::{AppError, AppResult};

/// Which second factor a principal is enrolled in.
///
/// Selects which of the principal's 2FA fields is meaningful: a TOTP
/// shared secret for `Totp`, a pending emailed code for `Email`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondFactorKind {
    None,
    Totp,
    Email,
}

impl SecondFactorKind {
    /// Storage representation (TEXT column)
    pub fn as_str(&self) -> &'static str {
        match self {
            SecondFactorKind::None => "none",
            SecondFactorKind::Totp => "totp",
            SecondFactorKind::Email => "email",
        }
    }

    /// Parse the storage representation
    pub fn from_db(s: &str) -> AppResult<Self> {
        match s {
            "none" => Ok(SecondFactorKind::None),
            "totp" => Ok(SecondFactorKind::Totp),
            "email" => Ok(SecondFactorKind::Email),
            other => Err(AppError::internal(format!(
                "Unknown two-factor type: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SecondFactorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Number of backup codes issued at TOTP enrollment
pub const BACKUP_CODE_COUNT: usize = 10;

/// Generate the one-time recovery codes returned at TOTP enrollment.
///
/// Each code is 8 uppercase hex characters. They are shown to the user
/// exactly once and are not persisted by this module.
pub fn generate_backup_codes() -> Vec<String> {
    (0..BACKUP_CODE_COUNT)
        .map(|_| platform::crypto::to_hex_upper(&platform::crypto::random_bytes(4)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_db_roundtrip() {
        for kind in [
            SecondFactorKind::None,
            SecondFactorKind::Totp,
            SecondFactorKind::Email,
        ] {
            assert_eq!(SecondFactorKind::from_db(kind.as_str()).unwrap(), kind);
        }
        assert!(SecondFactorKind::from_db("sms").is_err());
    }

    #[test]
    fn test_kind_serde_strings() {
        assert_eq!(
            serde_json::to_string(&SecondFactorKind::Totp).unwrap(),
            "\"totp\""
        );
        let parsed: SecondFactorKind = serde_json::from_str("\"email\"").unwrap();
        assert_eq!(parsed, SecondFactorKind::Email);
    }

    #[test]
    fn test_backup_codes_shape() {
        let codes = generate_backup_codes();
        assert_eq!(codes.len(), BACKUP_CODE_COUNT);
        for code in &codes {
            assert_eq!(code.len(), 8);
            assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(code.to_uppercase(), *code);
        }
    }

    #[test]
    fn test_backup_codes_are_independent() {
        let codes = generate_backup_codes();
        let mut unique = codes.clone();
        unique.sort();
        unique.dedup();
        // 10 draws from 2^32 values; a collision means the generator is broken
        assert_eq!(unique.len(), codes.len());
    }
}
