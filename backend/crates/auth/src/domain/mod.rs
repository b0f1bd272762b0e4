//! Domain Layer
//!
//! Entities, value objects, repository traits, and token issuance.

pub mod entity {
    pub mod session;
    pub mod user;

    pub use session::SessionRecord;
    pub use user::{Profile, User};
}

pub mod value_object {
    pub mod email;
    pub mod email_code;
    pub mod second_factor;
    pub mod totp_secret;

    pub use email::Email;
    pub use email_code::EmailChallenge;
    pub use second_factor::SecondFactorKind;
    pub use totp_secret::TotpSecret;
}

pub mod repository;
pub mod token;
