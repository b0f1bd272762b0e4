//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod notify;
pub mod send_code;
pub mod session;
pub mod sign_in;
pub mod sign_up;
pub mod two_factor;
pub mod verify_signup;

// Re-exports
pub use config::AuthConfig;
pub use send_code::SendCodeUseCase;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_up::{EnrollmentMaterial, SignUpInput, SignUpOutput, SignUpUseCase};
pub use two_factor::{EnrollInput, ToggleInput, TwoFactorUseCase};
pub use verify_signup::{VerifySignUpInput, VerifySignUpUseCase};
