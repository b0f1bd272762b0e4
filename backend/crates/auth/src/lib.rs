//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, token issuance
//! - `application/` - Use cases (signup, login, verification, resend)
//! - `infra/` - PostgreSQL and Redis implementations
//! - `presentation/` - HTTP handlers, DTOs, router, bearer middleware
//!
//! ## Features
//! - Signup/login with email + password (bcrypt, cost 12)
//! - Two second-factor mechanisms: TOTP (authenticator app) and emailed
//!   6-digit codes with a 10-minute window
//! - Dual bearer tokens per login: a 15-day session token and a 24-hour
//!   trading token, the latter mirrored into Redis for fast checks
//!
//! ## Security Model
//! - Generic credential errors (no account enumeration)
//! - Email codes are single-use, consumed by one atomic conditional update
//! - Sensitive fields are stripped from every principal returned to clients

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use infra::redis::RedisTokenCache;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
