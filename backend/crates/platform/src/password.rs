//! Password Hashing and Strength Policy
//!
//! - bcrypt hashing with a fixed work factor (adaptive, salted)
//! - Zeroization of clear-text material
//! - Strength policy that reports every violated rule, not just the first,
//!   so callers can surface the full list to the user at once

use std::fmt;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// bcrypt work factor. The cost is embedded in each digest.
pub const BCRYPT_COST: u32 = 12;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The accepted symbol set for the "special character" rule
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

// ============================================================================
// Error Types
// ============================================================================

/// A single violated password rule.
///
/// The `Display` text is client-facing and enumerated verbatim in
/// validation error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least 8 characters long")]
    TooShort,

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one number")]
    MissingDigit,

    #[error("Password must contain at least one special character")]
    MissingSymbol,
}

/// Hashing failure (salt generation or cost rejection). Verification never
/// produces an error; a digest that cannot be parsed verifies as false.
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

// ============================================================================
// Strength Policy
// ============================================================================

/// Check a candidate password against the strength policy.
///
/// Returns `Ok(())` when every rule passes, otherwise ALL violated rules.
pub fn validate_strength(password: &str) -> Result<(), Vec<PasswordPolicyError>> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(PasswordPolicyError::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push(PasswordPolicyError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push(PasswordPolicyError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push(PasswordPolicyError::MissingDigit);
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        violations.push(PasswordPolicyError::MissingSymbol);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear-text password with automatic memory zeroization.
///
/// Does not implement `Clone`; Debug output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    pub fn new(raw: String) -> Self {
        Self(raw)
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// Hash with bcrypt at [`BCRYPT_COST`]. A fresh random salt is drawn
    /// per call, so two hashes of the same password differ.
    pub fn hash(&self) -> Result<HashedPassword, PasswordHashError> {
        let digest = bcrypt::hash(&self.0, BCRYPT_COST)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        Ok(HashedPassword { digest })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// bcrypt digest in modular crypt format (`$2b$12$...`).
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    digest: String,
}

impl HashedPassword {
    /// Wrap a digest loaded from storage.
    pub fn from_digest(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
        }
    }

    /// Get the digest string for storage
    pub fn as_str(&self) -> &str {
        &self.digest
    }

    /// Verify a clear-text password against this digest.
    ///
    /// Uses bcrypt's own constant-structure comparison. Never errors:
    /// a mismatch or an unparseable digest both return false.
    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        bcrypt::verify(password.as_str(), &self.digest).unwrap_or(false)
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("digest", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_passes() {
        assert!(validate_strength("Str0ng!Pass").is_ok());
        assert!(validate_strength("An0ther#Good1").is_ok());
    }

    #[test]
    fn test_single_violations_are_exact() {
        // Each candidate violates exactly one rule
        let cases = [
            ("S7o!rt", PasswordPolicyError::TooShort),
            ("n0upper!case", PasswordPolicyError::MissingUppercase),
            ("N0LOWER!CASE", PasswordPolicyError::MissingLowercase),
            ("NoDigits!Here", PasswordPolicyError::MissingDigit),
            ("NoSymbol4Here", PasswordPolicyError::MissingSymbol),
        ];

        for (candidate, expected) in cases {
            let violations = validate_strength(candidate).unwrap_err();
            assert_eq!(violations, vec![expected], "candidate: {}", candidate);
        }
    }

    #[test]
    fn test_all_violations_reported() {
        let violations = validate_strength("aaaa").unwrap_err();
        assert_eq!(violations.len(), 4);
        assert!(violations.contains(&PasswordPolicyError::TooShort));
        assert!(violations.contains(&PasswordPolicyError::MissingUppercase));
        assert!(violations.contains(&PasswordPolicyError::MissingDigit));
        assert!(violations.contains(&PasswordPolicyError::MissingSymbol));
    }

    #[test]
    fn test_every_symbol_in_set_satisfies_rule() {
        for symbol in PASSWORD_SYMBOLS.chars() {
            let candidate = format!("Passw0rd{}", symbol);
            assert!(
                validate_strength(&candidate).is_ok(),
                "symbol {:?} should satisfy the rule",
                symbol
            );
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::new("TestPassword123!".to_string());
        let hashed = password.hash().unwrap();

        assert!(hashed.verify(&password));

        let wrong = ClearTextPassword::new("WrongPassword123!".to_string());
        assert!(!hashed.verify(&wrong));
    }

    #[test]
    fn test_hashes_are_salted() {
        let password = ClearTextPassword::new("TestPassword123!".to_string());
        let a = password.hash().unwrap();
        let b = password.hash().unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_verify_malformed_digest_is_false() {
        let hashed = HashedPassword::from_digest("not-a-bcrypt-digest");
        let password = ClearTextPassword::new("TestPassword123!".to_string());
        assert!(!hashed.verify(&password));
    }

    #[test]
    fn test_digest_roundtrip() {
        let password = ClearTextPassword::new("TestPassword123!".to_string());
        let hashed = password.hash().unwrap();

        let restored = HashedPassword::from_digest(hashed.as_str().to_string());
        assert!(restored.verify(&password));
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::new("secret".to_string());
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));
    }
}
