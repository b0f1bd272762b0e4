//! Auth Router

use axum::{
    Router,
    routing::post,
};
use std::sync::Arc;

use platform::mailer::{HttpMailer, Mailer};

use crate::application::config::AuthConfig;
use crate::domain::repository::{SessionRepository, TokenCache, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::infra::redis::RedisTokenCache;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with the production adapters
pub fn auth_router(
    repo: PgAuthRepository,
    cache: RedisTokenCache,
    mailer: HttpMailer,
    config: AuthConfig,
) -> Router {
    auth_router_generic(repo, cache, mailer, config)
}

/// Create an Auth router over any repository/cache/mailer implementations
pub fn auth_router_generic<R, C, M>(repo: R, cache: C, mailer: M, config: AuthConfig) -> Router
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
    C: TokenCache + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        cache: Arc::new(cache),
        mailer: Arc::new(mailer),
        tokens: Arc::new(config.token_issuer()),
    };

    Router::new()
        .route("/signup", post(handlers::sign_up::<R, C, M>))
        .route("/login", post(handlers::login::<R, C, M>))
        .route("/send-2fa", post(handlers::send_code::<R, C, M>))
        .route("/verify-signup", post(handlers::verify_signup::<R, C, M>))
        .route(
            "/2fa",
            post(handlers::two_factor_enroll::<R, C, M>)
                .put(handlers::two_factor_toggle::<R, C, M>),
        )
        .with_state(state)
}
