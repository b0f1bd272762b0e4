//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;

use kernel::id::UserId;
use platform::mailer::Mailer;

use crate::application::{
    EnrollInput, SendCodeUseCase, SignInInput, SignInUseCase, SignUpInput, SignUpUseCase,
    ToggleInput, TwoFactorUseCase, VerifySignUpInput, VerifySignUpUseCase,
};
use crate::domain::entity::user::Profile;
use crate::domain::repository::{SessionRepository, TokenCache, UserRepository};
use crate::domain::token::TokenIssuer;
use crate::error::AuthResult;
use crate::presentation::dto::{
    AuthenticatedResponse, SendCodeRequest, SendCodeResponse, SignInRequest, SignUpRequest,
    SignUpResponse, ToggleResponse, TwoFactorEnrollRequest, TwoFactorSetupView,
    TwoFactorToggleRequest, UserView, VerifySignUpRequest,
};
use crate::presentation::extract::ValidJson;

/// Shared state for auth handlers
pub struct AuthAppState<R, C, M>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
    C: TokenCache + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub cache: Arc<C>,
    pub mailer: Arc<M>,
    pub tokens: Arc<TokenIssuer>,
}

// Manual impl: a derive would require `M: Clone`, but only the `Arc`s are cloned.
impl<R, C, M> Clone for AuthAppState<R, C, M>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
    C: TokenCache + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            cache: self.cache.clone(),
            mailer: self.mailer.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R, C, M>(
    State(state): State<AuthAppState<R, C, M>>,
    ValidJson(req): ValidJson<SignUpRequest>,
) -> AuthResult<(StatusCode, Json<SignUpResponse>)>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
    C: TokenCache + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.mailer.clone());

    let input = SignUpInput {
        email: req.email,
        password: req.password,
        profile: Profile {
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            date_of_birth: req.date_of_birth,
            address: req.address,
            city: req.city,
            state: req.state,
            zip_code: req.zip_code,
            country: req.country,
            ssn_last4: req.ssn_last4,
            employment_status: req.employment_status,
            annual_income: req.annual_income,
            net_worth: req.net_worth,
            investment_experience: req.investment_experience,
            risk_tolerance: req.risk_tolerance,
            account_type: req.account_type,
        },
        two_factor_kind: req.two_factor_type,
    };

    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user_id: output.user.id.into_uuid(),
            user: UserView::from(&output.user),
            requires_verification: true,
            two_factor_setup: TwoFactorSetupView::from(output.enrollment),
            message: "Account created. Verify your second factor to continue.".to_string(),
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, C, M>(
    State(state): State<AuthAppState<R, C, M>>,
    ValidJson(req): ValidJson<SignInRequest>,
) -> AuthResult<Json<AuthenticatedResponse>>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
    C: TokenCache + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.cache.clone(),
        state.mailer.clone(),
        state.tokens.clone(),
    );

    let input = SignInInput {
        email: req.email,
        password: req.password,
        two_factor_code: req.two_factor_code,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(AuthenticatedResponse {
        user: UserView::from(&output.user),
        session_token: output.tokens.session_token.clone(),
        trading_token: output.tokens.trading_token.clone(),
        expires_in: output.tokens.expires_in_ms(),
        trading_expires_in: output.tokens.trading_expires_in_ms(),
    }))
}

// ============================================================================
// Send 2FA Code
// ============================================================================

/// POST /api/auth/send-2fa
pub async fn send_code<R, C, M>(
    State(state): State<AuthAppState<R, C, M>>,
    ValidJson(req): ValidJson<SendCodeRequest>,
) -> AuthResult<Json<SendCodeResponse>>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
    C: TokenCache + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SendCodeUseCase::new(state.repo.clone(), state.mailer.clone());

    use_case.execute(&req.email).await?;

    Ok(Json(SendCodeResponse {
        kind: crate::domain::value_object::second_factor::SecondFactorKind::Email,
        message: "Verification code sent".to_string(),
    }))
}

// ============================================================================
// Verify Signup
// ============================================================================

/// POST /api/auth/verify-signup
pub async fn verify_signup<R, C, M>(
    State(state): State<AuthAppState<R, C, M>>,
    ValidJson(req): ValidJson<VerifySignUpRequest>,
) -> AuthResult<Json<AuthenticatedResponse>>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
    C: TokenCache + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = VerifySignUpUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.cache.clone(),
        state.tokens.clone(),
    );

    let input = VerifySignUpInput {
        user_id: UserId::from_uuid(req.user_id),
        code: req.code,
        kind: req.kind,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(AuthenticatedResponse {
        user: UserView::from(&output.user),
        session_token: output.tokens.session_token.clone(),
        trading_token: output.tokens.trading_token.clone(),
        expires_in: output.tokens.expires_in_ms(),
        trading_expires_in: output.tokens.trading_expires_in_ms(),
    }))
}

// ============================================================================
// Two-Factor Enroll / Toggle
// ============================================================================

/// POST /api/auth/2fa
pub async fn two_factor_enroll<R, C, M>(
    State(state): State<AuthAppState<R, C, M>>,
    ValidJson(req): ValidJson<TwoFactorEnrollRequest>,
) -> AuthResult<Json<TwoFactorSetupView>>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
    C: TokenCache + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = TwoFactorUseCase::new(state.repo.clone(), state.mailer.clone());

    let material = use_case
        .enroll(EnrollInput {
            user_id: UserId::from_uuid(req.user_id),
            kind: req.kind,
        })
        .await?;

    Ok(Json(TwoFactorSetupView::from(material)))
}

/// PUT /api/auth/2fa
pub async fn two_factor_toggle<R, C, M>(
    State(state): State<AuthAppState<R, C, M>>,
    ValidJson(req): ValidJson<TwoFactorToggleRequest>,
) -> AuthResult<Json<ToggleResponse>>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
    C: TokenCache + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = TwoFactorUseCase::new(state.repo.clone(), state.mailer.clone());

    use_case
        .toggle(ToggleInput {
            user_id: UserId::from_uuid(req.user_id),
            code: req.code,
            enable: req.enable,
        })
        .await?;

    let message = if req.enable {
        "Two-factor authentication enabled"
    } else {
        "Two-factor authentication disabled"
    };

    Ok(Json(ToggleResponse {
        is_2fa_enabled: req.enable,
        message: message.to_string(),
    }))
}
