//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and bearer-token middleware.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::AuthenticatedPrincipal;
pub use router::{auth_router, auth_router_generic};
