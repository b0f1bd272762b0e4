//! Auth Middleware
//!
//! Bearer-token checks for protected routes. Session tokens gate general
//! authenticated access; trading tokens gate trading-sensitive routes.

use axum::body::Body;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use kernel::error::app_error::AppError;
use kernel::id::UserId;

use crate::domain::token::{TokenIssuer, TokenKind};

/// Principal extracted from a verified bearer token, inserted as a request
/// extension for downstream handlers
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedPrincipal {
    pub user_id: UserId,
    pub token_kind: TokenKind,
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn require_token(
    tokens: Arc<TokenIssuer>,
    kind: TokenKind,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(&req)
        .ok_or_else(|| AppError::unauthorized("Missing bearer token").into_response())?;

    let claims = tokens
        .verify(token, kind)
        .map_err(|_| AppError::unauthorized("Invalid or expired token").into_response())?;

    req.extensions_mut().insert(AuthenticatedPrincipal {
        user_id: UserId::from_uuid(claims.sub),
        token_kind: claims.kind,
    });

    Ok(next.run(req).await)
}

/// Middleware that requires a valid session token
pub async fn require_session_token(
    axum::extract::State(tokens): axum::extract::State<Arc<TokenIssuer>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    require_token(tokens, TokenKind::Session, req, next).await
}

/// Middleware that requires a valid trading token
pub async fn require_trading_token(
    axum::extract::State(tokens): axum::extract::State<Arc<TokenIssuer>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    require_token(tokens, TokenKind::Trading, req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Extension;
    use axum::http::StatusCode;
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::Router;
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use crate::application::config::AuthConfig;
    use crate::domain::token::TokenPair;

    fn request_with_auth(value: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_extraction() {
        let req = request_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&req), Some("abc.def.ghi"));

        let req = request_with_auth(Some("Basic dXNlcg=="));
        assert_eq!(bearer_token(&req), None);

        let req = request_with_auth(None);
        assert_eq!(bearer_token(&req), None);
    }

    /// Echoes the principal id the middleware inserted
    async fn whoami(Extension(principal): Extension<AuthenticatedPrincipal>) -> String {
        principal.user_id.to_string()
    }

    fn session_guarded(tokens: Arc<TokenIssuer>) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .layer(from_fn_with_state(tokens, require_session_token))
    }

    fn trading_guarded(tokens: Arc<TokenIssuer>) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .layer(from_fn_with_state(tokens, require_trading_token))
    }

    async fn call(app: Router, auth: Option<String>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/me");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn issuer() -> Arc<TokenIssuer> {
        Arc::new(AuthConfig::development().token_issuer())
    }

    fn pair(tokens: &TokenIssuer, user_id: UserId) -> TokenPair {
        tokens.issue_pair(user_id).unwrap()
    }

    #[tokio::test]
    async fn test_valid_session_token_exposes_principal() {
        let tokens = issuer();
        let user_id = UserId::new();
        let pair = pair(&tokens, user_id);

        let (status, body) = call(
            session_guarded(tokens),
            Some(format!("Bearer {}", pair.session_token)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, user_id.to_string());
    }

    #[tokio::test]
    async fn test_missing_and_malformed_tokens_rejected() {
        let tokens = issuer();

        let (status, body) = call(session_guarded(tokens.clone()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("error"));

        let (status, _) = call(
            session_guarded(tokens),
            Some("Bearer not-a-jwt".to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_kind_mismatch_rejected_both_directions() {
        let tokens = issuer();
        let pair = pair(&tokens, UserId::new());

        // Session token on a trading route
        let (status, _) = call(
            trading_guarded(tokens.clone()),
            Some(format!("Bearer {}", pair.session_token)),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Trading token on a session route
        let (status, _) = call(
            session_guarded(tokens.clone()),
            Some(format!("Bearer {}", pair.trading_token)),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Trading token on a trading route passes
        let (status, _) = call(
            trading_guarded(tokens),
            Some(format!("Bearer {}", pair.trading_token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let tokens = issuer();
        let stale = tokens
            .issue_pair_at(UserId::new(), Utc::now() - Duration::days(30))
            .unwrap();

        let (status, _) = call(
            session_guarded(tokens),
            Some(format!("Bearer {}", stale.session_token)),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
