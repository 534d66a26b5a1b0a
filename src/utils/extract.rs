// src/utils/extract.rs

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{error::AppError, models::user::Role, utils::jwt::Claims};

/// Identity of the caller, taken from the verified token.
///
/// Only available on routes behind `auth_middleware`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: i64,
    pub role: Role,
    pub tenant_id: i64,
}

impl RequestContext {
    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }

    /// Fails with `Forbidden` unless the caller holds one of `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "User role {} is not authorized to access this route",
                self.role.as_str()
            )))
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .ok_or_else(|| AppError::AuthError("Not authorized, no token".to_string()))?;

        Ok(RequestContext {
            user_id: claims.user_id()?,
            role: claims.role,
            tenant_id: claims.tenant_id,
        })
    }
}

/// JSON body that is deserialized and then validated.
///
/// Malformed bodies (wrong types, missing fields) and validation failures
/// both surface as 400 with the error envelope.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
