//! Request Extractors
//!
//! `ValidJson` behaves like `axum::Json` but reports a missing or
//! malformed body as a 400 validation error with the standard `error`
//! body, so missing-field failures look like every other input failure.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::error::AuthError;

pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AuthError::InvalidInput(rejection.body_text()))?;
        Ok(Self(value))
    }
}
